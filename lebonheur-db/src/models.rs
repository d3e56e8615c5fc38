use anyhow::{bail, Result};

/// Taille du pool de numéros du Loto Bonheur (1 à 90).
pub const POOL_SIZE: u8 = 90;
/// Nombre de numéros gagnants par tirage.
pub const PICK_COUNT: usize = 5;

/// Un tirage publié : 5 numéros gagnants, et en général 5 numéros machine.
#[derive(Debug, Clone)]
pub struct Draw {
    pub category: String,
    pub date: String,
    pub winning: [u8; 5],
    pub machine: Vec<u8>,
}

impl Draw {
    /// Vrai si le numéro apparaît dans le tirage (gagnants ou machine).
    pub fn has_number(&self, n: u8) -> bool {
        self.winning.contains(&n) || self.machine.contains(&n)
    }
}

/// Une prédiction émise pour une catégorie de tirage. `actual` reste `None`
/// tant que le tirage visé n'a pas été rapproché (commande `resolve`).
#[derive(Debug, Clone)]
pub struct Prediction {
    pub id: i64,
    pub category: String,
    pub date: String,
    pub predicted: [u8; 5],
    pub actual: Option<[u8; 5]>,
}

impl Prediction {
    /// Nombre de numéros prédits effectivement sortis. `None` si non résolu.
    pub fn hits(&self) -> Option<u32> {
        self.actual.as_ref().map(|actual| {
            self.predicted
                .iter()
                .filter(|n| actual.contains(n))
                .count() as u32
        })
    }
}

pub fn validate_winning(winning: &[u8; 5]) -> Result<()> {
    for &n in winning {
        if n < 1 || n > POOL_SIZE {
            bail!("Numéro {} hors limites (1-{})", n, POOL_SIZE);
        }
    }
    for i in 0..winning.len() {
        for j in (i + 1)..winning.len() {
            if winning[i] == winning[j] {
                bail!("Numéro gagnant en double : {}", winning[i]);
            }
        }
    }
    Ok(())
}

pub fn validate_machine(machine: &[u8]) -> Result<()> {
    if machine.len() > PICK_COUNT {
        bail!(
            "Trop de numéros machine : {} (maximum {})",
            machine.len(),
            PICK_COUNT
        );
    }
    for &n in machine {
        if n < 1 || n > POOL_SIZE {
            bail!("Numéro machine {} hors limites (1-{})", n, POOL_SIZE);
        }
    }
    for i in 0..machine.len() {
        for j in (i + 1)..machine.len() {
            if machine[i] == machine[j] {
                bail!("Numéro machine en double : {}", machine[i]);
            }
        }
    }
    Ok(())
}

/// Les enregistrements invalides sont écartés avant analyse, jamais réparés.
pub fn validate_draw(draw: &Draw) -> Result<()> {
    validate_winning(&draw.winning)?;
    validate_machine(&draw.machine)?;
    Ok(())
}
