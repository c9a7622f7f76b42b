use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

use crate::error::SeedError;

const FIRST_NAMES: &[&str] = &[
    "Aaron", "Abigail", "Ada", "Adrian", "Aisha", "Alan", "Alejandro", "Alice", "Amara", "Amelia",
    "Andre", "Angela", "Anika", "Anton", "Arjun", "Astrid", "Barbara", "Beatriz", "Benjamin",
    "Bjorn", "Bruno", "Camille", "Carlos", "Carmen", "Chen", "Chloe", "Claire", "Colin", "Dana",
    "Daniel", "Dmitri", "Dolores", "Eamon", "Elena", "Elif", "Emeka", "Emil", "Esther", "Ethan",
    "Farah", "Fatima", "Felix", "Fiona", "Gabriel", "Gemma", "Grace", "Hamid", "Hannah", "Hector",
    "Helga", "Hiro", "Ines", "Ingrid", "Isaac", "Ivan", "Jamal", "Jasmine", "Javier", "Joanna",
    "Jonas", "Julia", "Kai", "Kamala", "Karim", "Katya", "Kenji", "Kofi", "Laila", "Lars", "Leona",
    "Linus", "Lucia", "Magnus", "Maria", "Marcus", "Mateo", "Maya", "Mei", "Miguel", "Milan",
    "Nadia", "Naomi", "Nikolai", "Noah", "Nora", "Olga", "Omar", "Oscar", "Pablo", "Petra", "Priya",
    "Quentin", "Rafael", "Rania", "Ravi", "Rosa", "Ruth", "Samir", "Sana", "Selma", "Sofia",
    "Soren", "Stella", "Tariq", "Tessa", "Theo", "Uma", "Ursula", "Valentina", "Victor", "Vivian",
    "Wanda", "Wei", "Xavier", "Yara", "Yuki", "Yusuf", "Zainab", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Adeyemi", "Alvarez", "Andersen", "Bauer", "Becker", "Bianchi", "Brennan", "Castillo",
    "Chowdhury", "Costa", "Dubois", "Dumont", "Eriksen", "Esposito", "Fischer", "Fernandes",
    "Fitzgerald", "Garcia", "Gonzaga", "Gruber", "Haddad", "Hansen", "Hopper", "Horvath", "Ibrahim",
    "Ivanova", "Jansen", "Jensen", "Kaur", "Keller", "Kim", "Kowalski", "Kruger", "Larsen",
    "Lindqvist", "Lopez", "Lovelace", "Mahlangu", "Marino", "Mendes", "Moreau", "Muller", "Murphy",
    "Nakamura", "Nguyen", "Novak", "Nowak", "Obi", "Okafor", "Olsen", "Ortiz", "Papadopoulos",
    "Park", "Patel", "Petrov", "Pereira", "Quinn", "Ramos", "Reyes", "Richter", "Rossi", "Russo",
    "Sato", "Santos", "Schmidt", "Silva", "Sokolov", "Suzuki", "Tanaka", "Tembo", "Turing", "Ueda",
    "Vargas", "Varga", "Vasquez", "Weber", "Wagner", "Walsh", "Watanabe", "Xu", "Yamamoto",
    "Yilmaz", "Zhang", "Ziegler", "Zimmermann", "Okonkwo", "Bergstrom", "Castellanos", "Delacroix",
    "Halvorsen", "Kristiansen", "Lindgren", "Mbeki", "Moretti", "Nieminen", "Oyelaran", "Rasmussen",
    "Sandoval", "Takahashi", "Valdez", "Wojcik",
];

const PREFIXES: &[&str] = &["Dr.", "Mr.", "Mrs.", "Ms.", "Miss", "Prof."];

const SUFFIXES: &[&str] = &["Jr.", "Sr.", "II", "III", "IV", "MD", "PhD", "DDS"];

/// Random fixture values backed by a seedable RNG
pub struct Faker {
    rng: StdRng,
}

impl Faker {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }

    /// A person name: "First Last", usually with a middle initial and
    /// occasionally with a title or a suffix
    pub fn name(&mut self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(5);

        if self.rng.gen_ratio(1, 8) {
            parts.push(self.pick(PREFIXES).to_string());
        }
        parts.push(self.pick(FIRST_NAMES).to_string());
        // 26 initials plus "none", all equally likely
        let initial = self.rng.gen_range(0..27u8);
        if initial < 26 {
            parts.push(format!("{}.", (b'A' + initial) as char));
        }
        parts.push(self.pick(LAST_NAMES).to_string());
        if self.rng.gen_ratio(1, 8) {
            parts.push(self.pick(SUFFIXES).to_string());
        }

        parts.join(" ")
    }

    fn pick(&mut self, words: &[&'static str]) -> &'static str {
        words[self.rng.gen_range(0..words.len())]
    }

    /// Uniform timestamp in `[start, end]`, whole seconds
    pub fn date_time_between(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, SeedError> {
        if start > end {
            return Err(SeedError::InvalidWindow { start, end });
        }
        let span = (end - start).num_seconds();
        let offset = self.rng.gen_range(0..=span);
        Ok(start + Duration::seconds(offset))
    }

    /// Uniform integer in the inclusive range
    pub fn quantity(&mut self, range: RangeInclusive<i64>) -> Result<i64, SeedError> {
        if range.is_empty() {
            return Err(SeedError::InvalidQuantityRange {
                min: *range.start(),
                max: *range.end(),
            });
        }
        Ok(self.rng.gen_range(range))
    }

    pub fn choose_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for Faker {
    fn default() -> Self {
        Self::new()
    }
}
