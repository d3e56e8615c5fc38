/// Programme officiel des tirages : table immuable consultée par la CLI.
/// Une catégorie absente du programme reste analysable (nouvelle catégorie
/// fraîchement ajoutée = situation normale, pas une erreur).
#[derive(Debug, Clone, Copy)]
pub struct DrawSlot {
    pub day: &'static str,
    pub time: &'static str,
    pub name: &'static str,
}

pub const SCHEDULE: &[DrawSlot] = &[
    DrawSlot { day: "Lundi", time: "10H", name: "Réveil" },
    DrawSlot { day: "Lundi", time: "13H", name: "Étoile" },
    DrawSlot { day: "Lundi", time: "18H", name: "Monni" },
    DrawSlot { day: "Mardi", time: "10H", name: "Matinale" },
    DrawSlot { day: "Mardi", time: "13H", name: "Émergence" },
    DrawSlot { day: "Mardi", time: "18H", name: "Sika" },
    DrawSlot { day: "Mercredi", time: "10H", name: "Première Heure" },
    DrawSlot { day: "Mercredi", time: "13H", name: "Fortune" },
    DrawSlot { day: "Mercredi", time: "18H", name: "Baraka" },
    DrawSlot { day: "Jeudi", time: "10H", name: "Kiessé" },
    DrawSlot { day: "Jeudi", time: "13H", name: "Privilège" },
    DrawSlot { day: "Jeudi", time: "18H", name: "Diamant" },
    DrawSlot { day: "Vendredi", time: "10H", name: "Cash" },
    DrawSlot { day: "Vendredi", time: "13H", name: "Solidarité" },
    DrawSlot { day: "Vendredi", time: "18H", name: "Prestige" },
    DrawSlot { day: "Samedi", time: "10H", name: "Soutra" },
    DrawSlot { day: "Samedi", time: "13H", name: "Bénédiction" },
    DrawSlot { day: "Samedi", time: "18H", name: "Awalé" },
    DrawSlot { day: "Dimanche", time: "10H", name: "Espoir" },
    DrawSlot { day: "Dimanche", time: "13H", name: "Akwaba" },
    DrawSlot { day: "Dimanche", time: "18H", name: "Moaye" },
];

pub fn slot(name: &str) -> Option<&'static DrawSlot> {
    SCHEDULE.iter().find(|s| s.name == name)
}

pub fn is_scheduled(name: &str) -> bool {
    slot(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_names_unique() {
        for i in 0..SCHEDULE.len() {
            for j in (i + 1)..SCHEDULE.len() {
                assert_ne!(
                    SCHEDULE[i].name, SCHEDULE[j].name,
                    "nom de tirage en double : {}",
                    SCHEDULE[i].name
                );
            }
        }
    }

    #[test]
    fn test_schedule_three_slots_per_day() {
        for day in ["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche"] {
            let n = SCHEDULE.iter().filter(|s| s.day == day).count();
            assert_eq!(n, 3, "{} devrait avoir 3 tirages", day);
        }
    }

    #[test]
    fn test_slot_lookup() {
        assert!(is_scheduled("Étoile"));
        assert_eq!(slot("Akwaba").unwrap().day, "Dimanche");
        assert!(!is_scheduled("Inconnu"));
    }
}
