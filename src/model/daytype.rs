use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Categorical code stored on every tracking entry.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
    ToSchema, AsRefStr, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DayType {
    Wkday,
    Sickd,
    Holis,
    Speci,
    Train,
    Wkhom,
    Other,
    Rover,
    Puabs,
    Puwrk,
    Retrn,
    Wkend,
}

impl DayType {
    pub fn label(self) -> &'static str {
        match self {
            DayType::Wkday => "Work Day",
            DayType::Sickd => "Sickness Absence",
            DayType::Holis => "Holiday",
            DayType::Speci => "Special Leave",
            DayType::Train => "Training",
            DayType::Wkhom => "Work from Home",
            DayType::Other => "Other",
            DayType::Rover => "Return for overtime",
            DayType::Puabs => "Public Holiday",
            DayType::Puwrk => "Work on Public Holiday",
            DayType::Retrn => "Return from Leave",
            DayType::Wkend => "Weekend",
        }
    }

    /// Clock times on these entries count towards overtime.
    pub fn is_working(self) -> bool {
        matches!(self, DayType::Wkday | DayType::Wkhom | DayType::Train)
    }

    /// Weekend cells are a display marker and never stored.
    pub fn is_storable(self) -> bool {
        self != DayType::Wkend
    }
}

impl TryFrom<String> for DayType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
