//! Column schema of the obesity-level dataset and the typed request record.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data_handling::Table;
use crate::error::Result;
use crate::model::{EncoderTarget, Trainer};
use crate::preprocessing::EncoderType;

pub const TARGET_COLUMN: &str = "NObeyesdad";
pub const AGE_COLUMN: &str = "Age";

/// Feature columns in dataset order.
pub const FEATURE_COLUMNS: [&str; 16] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "family_history_with_overweight",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF",
    "TUE",
    "CALC",
    "MTRANS",
];

/// Target labels, lightest to heaviest.
pub const TARGET_CLASSES: [&str; 7] = [
    "Insufficient_Weight",
    "Normal_Weight",
    "Overweight_Level_I",
    "Overweight_Level_II",
    "Obesity_Type_I",
    "Obesity_Type_II",
    "Obesity_Type_III",
];

/// Order of the snacking (`CAEC`) and alcohol (`CALC`) frequency answers.
pub const FREQUENCY_ORDER: [&str; 4] = ["no", "Sometimes", "Frequently", "Always"];

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(Gender {
    Male => "Male",
    Female => "Female",
});

string_enum!(YesNo {
    Yes => "yes",
    No => "no",
});

string_enum!(
    /// Answers for snacking and alcohol frequency.
    Frequency {
        No => "no",
        Sometimes => "Sometimes",
        Frequently => "Frequently",
        Always => "Always",
    }
);

string_enum!(
    /// Main transport mode. The wire form uses underscores.
    Transport {
        PublicTransportation => "Public_Transportation",
        Automobile => "Automobile",
        Bike => "Bike",
        Walking => "Walking",
        Motorbike => "Motorbike",
    }
);

/// One prediction request: the sixteen features under their request names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    pub gender: Gender,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub family_history_with_overweight: YesNo,
    pub favc: YesNo,
    pub fcvc: f64,
    pub ncp: f64,
    pub caec: Frequency,
    pub smoke: YesNo,
    pub ch20: f64,
    pub scc: YesNo,
    pub faf: f64,
    pub tue: f64,
    pub calc: Frequency,
    pub mtrans: Transport,
}

impl ModelInput {
    /// Cell values in [`FEATURE_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.gender.to_string(),
            self.age.to_string(),
            self.height.to_string(),
            self.weight.to_string(),
            self.family_history_with_overweight.to_string(),
            self.favc.to_string(),
            self.fcvc.to_string(),
            self.ncp.to_string(),
            self.caec.to_string(),
            self.smoke.to_string(),
            self.ch20.to_string(),
            self.scc.to_string(),
            self.faf.to_string(),
            self.tue.to_string(),
            self.calc.to_string(),
            self.mtrans.to_string(),
        ]
    }

    pub fn to_table(&self) -> Result<Table> {
        Table::new(
            FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![self.to_row()],
        )
    }

    /// Fixed record used to sanity-check a freshly trained model.
    pub fn sample() -> Self {
        ModelInput {
            gender: Gender::Female,
            age: 19,
            height: 1.60,
            weight: 45.0,
            family_history_with_overweight: YesNo::No,
            favc: YesNo::No,
            fcvc: 3.0,
            ncp: 3.0,
            caec: Frequency::No,
            smoke: YesNo::No,
            ch20: 3.0,
            scc: YesNo::Yes,
            faf: 2.0,
            tue: 0.0,
            calc: Frequency::No,
            mtrans: Transport::Walking,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Register the standard encoders for the obesity dataset on `trainer`.
pub fn register_default_encoders(trainer: &mut Trainer) -> Result<()> {
    trainer.add_encoder(EncoderTarget::columns(["Gender"]), EncoderType::OneHot, None)?;
    trainer.add_encoder(EncoderTarget::columns(["MTRANS"]), EncoderType::OneHot, None)?;
    trainer.add_encoder(
        EncoderTarget::columns(["family_history_with_overweight", "FAVC", "SMOKE", "SCC"]),
        EncoderType::Label,
        None,
    )?;
    trainer.add_encoder(
        EncoderTarget::columns(["CAEC", "CALC"]),
        EncoderType::Ordinal,
        Some(strings(&FREQUENCY_ORDER)),
    )?;
    trainer.add_encoder(
        EncoderTarget::Target,
        EncoderType::Ordinal,
        Some(strings(&TARGET_CLASSES)),
    )?;
    Ok(())
}
