// Weekday tokens and calendar-ordered day sets
use crate::normalizer::normalize;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Monday = 0 ... Sunday = 6.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Display name used in bot messages.
    pub fn spanish(self) -> &'static str {
        match self {
            Weekday::Monday => "lunes",
            Weekday::Tuesday => "martes",
            Weekday::Wednesday => "miércoles",
            Weekday::Thursday => "jueves",
            Weekday::Friday => "viernes",
            Weekday::Saturday => "sábado",
            Weekday::Sunday => "domingo",
        }
    }

    /// Parses a single day token: English or Spanish name, plural, or short form
    /// (with or without trailing period). Accents and case are ignored.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = normalize(token.trim());
        let token = token.trim_end_matches('.');
        let day = match token {
            "monday" | "mon" | "lunes" | "lun" => Weekday::Monday,
            "tuesday" | "tue" | "martes" | "mar" => Weekday::Tuesday,
            "wednesday" | "wed" | "miercoles" | "mie" => Weekday::Wednesday,
            "thursday" | "thu" | "jueves" | "jue" => Weekday::Thursday,
            "friday" | "fri" | "viernes" | "vie" => Weekday::Friday,
            "saturday" | "sat" | "sabado" | "sabados" | "sab" => Weekday::Saturday,
            "sunday" | "sun" | "domingo" | "domingos" | "dom" => Weekday::Sunday,
            _ => return None,
        };
        Some(day)
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        // chrono counts Monday as 0 as well
        Self::ALL[day.num_days_from_monday() as usize]
    }

    pub fn today() -> Self {
        use chrono::Datelike;
        Self::from_chrono(chrono::Local::now().weekday())
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Weekday::from_token(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown weekday '{}'", raw)))
    }
}

/// Set of weekdays. Iterates Monday to Sunday and holds each day at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DaySet(u8);

impl DaySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self(0b0111_1111)
    }

    /// Inclusive range in calendar order; wraps past Sunday when `start` comes after `end`.
    pub fn range(start: Weekday, end: Weekday) -> Self {
        let mut set = Self::new();
        let mut idx = start.index();
        loop {
            set.insert(Weekday::ALL[idx]);
            if idx == end.index() {
                break;
            }
            idx = (idx + 1) % 7;
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.index();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn union(self, other: DaySet) -> DaySet {
        DaySet(self.0 | other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = DaySet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Weekday> for DaySet {
    fn extend<I: IntoIterator<Item = Weekday>>(&mut self, iter: I) {
        for day in iter {
            self.insert(day);
        }
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == DaySet::all() {
            return f.write_str("todos los días");
        }
        let names: Vec<&str> = self.iter().map(Weekday::spanish).collect();
        f.write_str(&names.join(", "))
    }
}

impl Serialize for DaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for day in self.iter() {
            seq.serialize_element(&day)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for DaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = Vec::<Weekday>::deserialize(deserializer)?;
        Ok(days.into_iter().collect())
    }
}
