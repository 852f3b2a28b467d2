use std::fmt;
use std::str::FromStr;

// @module: Typed substitution rows and their sort order

/// Header row of every rebuilt student table
pub const NEW_HEADERS: [&str; 9] = [
    "Klasse(n)",
    "Stunde",
    "Vertreter",
    "(Lehrer)",
    "Fach",
    "Raum",
    "(Fach)",
    "Art",
    "Text",
];

/// Source cell index feeding each destination column
pub const COLUMN_MAP: [usize; 9] = [2, 1, 0, 5, 3, 4, 3, 7, 8];

/// Number of cells a source row must carry
pub const SOURCE_COLUMNS: usize = 9;

/// Class names sorted after all numbered classes
pub const SPECIAL_CLASSES: [&str; 7] = ["E1", "E2", "Q1", "Q2", "Q3", "Q4", "AG"];

/// Placeholder for columns that carry nothing on a cancelled lesson
pub const CANCELLED_PLACEHOLDER: &str = "---";

/// Destination columns blanked out for cancelled lessons (Vertreter, Fach, Raum)
const CANCELLED_COLUMNS: [usize; 3] = [2, 4, 5];

// Source positions of the named cells
const SUBSTITUTE: usize = 0;
const PERIOD: usize = 1;
const CLASSES: usize = 2;
const SUBJECT: usize = 3;
const ROOM: usize = 4;
const ABSENT_TEACHER: usize = 5;
const KIND: usize = 7;
const TEXT: usize = 8;

/// Kind of schedule change ("Art") a row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstitutionKind {
    Substitution,
    Cancellation,
    TeacherSwap,
    Relocation,
    LessonChanged,
    SpecialAssignment,
    RoomChange,
    Swap,
}

impl SubstitutionKind {
    pub const ALL: [SubstitutionKind; 8] = [
        Self::Substitution,
        Self::Cancellation,
        Self::TeacherSwap,
        Self::Relocation,
        Self::LessonChanged,
        Self::SpecialAssignment,
        Self::RoomChange,
        Self::Swap,
    ];

    /// Label as printed by the vendor
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substitution => "Vertretung",
            Self::Cancellation => "Entfall",
            Self::TeacherSwap => "Lehrertausch",
            Self::Relocation => "Verlegung",
            Self::LessonChanged => "Unterricht geändert",
            Self::SpecialAssignment => "Sondereins.",
            Self::RoomChange => "Raum-Vtr.",
            Self::Swap => "Tausch",
        }
    }
}

impl fmt::Display for SubstitutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown "Art" label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for SubstitutionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// One data row of a `mon_list` table, in source column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRow {
    cells: [String; SOURCE_COLUMNS],
    kind: SubstitutionKind,
}

impl SubstitutionRow {
    /// Build a row from trimmed cell texts.
    ///
    /// Returns `None` for rows that are too short or whose "Art" is not one
    /// of the recognised kinds.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        if cells.len() < SOURCE_COLUMNS {
            return None;
        }
        let kind = cells[KIND].parse::<SubstitutionKind>().ok()?;
        let cells: [String; SOURCE_COLUMNS] = std::array::from_fn(|i| cells[i].clone());
        Some(Self { cells, kind })
    }

    pub fn substitute(&self) -> &str {
        &self.cells[SUBSTITUTE]
    }

    pub fn period(&self) -> &str {
        &self.cells[PERIOD]
    }

    pub fn classes(&self) -> &str {
        &self.cells[CLASSES]
    }

    pub fn subject(&self) -> &str {
        &self.cells[SUBJECT]
    }

    pub fn room(&self) -> &str {
        &self.cells[ROOM]
    }

    pub fn absent_teacher(&self) -> &str {
        &self.cells[ABSENT_TEACHER]
    }

    pub fn kind(&self) -> SubstitutionKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.cells[TEXT]
    }

    pub fn sort_key(&self) -> ClassSortKey {
        ClassSortKey::from_class(self.classes())
    }

    /// Cell texts in `NEW_HEADERS` order
    pub fn student_cells(&self) -> [String; 9] {
        let mut out: [String; 9] = std::array::from_fn(|i| self.cells[COLUMN_MAP[i]].clone());
        if self.kind == SubstitutionKind::Cancellation {
            for column in CANCELLED_COLUMNS {
                out[column] = CANCELLED_PLACEHOLDER.to_string();
            }
        }
        out
    }
}

/// Ordering key derived from a row's class cell.
///
/// Variant order is the sort order: numbered classes, then the special
/// upper-school groups, then rows without a class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClassSortKey {
    Numeric { number: u32, suffix: String },
    Special(String),
    Empty,
}

impl ClassSortKey {
    pub fn from_class(raw: &str) -> Self {
        let name: String = raw.chars().filter(|c| *c != '(' && *c != ')').collect();
        let name = name.trim();

        if name.is_empty() {
            return Self::Empty;
        }
        if SPECIAL_CLASSES.contains(&name) {
            return Self::Special(name.to_string());
        }

        let split = name
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(name.len(), |(i, _)| i);
        let (digits, suffix) = name.split_at(split);
        // Prefixes too long for u32 fall back to 0 like a missing one
        let number = digits.parse::<u32>().unwrap_or(0);

        Self::Numeric {
            number,
            suffix: suffix.to_string(),
        }
    }
}

/// Stable ascending sort by class
pub fn sort_rows(rows: &mut [SubstitutionRow]) {
    rows.sort_by_key(SubstitutionRow::sort_key);
}
