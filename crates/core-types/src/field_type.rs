//! Field-type catalog shared by every signal source and by downstream fillers.
//!
//! The string identifiers are the only wire format of the engine: pattern
//! tables, structured-data mappings and filler value lookups all key on them.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

macro_rules! field_catalog {
    ($($variant:ident => $id:literal),+ $(,)?) => {
        /// Canonical semantic purpose of a data-entry element.
        #[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde-full", serde(rename_all = "camelCase"))]
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub enum FieldType {
            $($variant),+
        }

        impl FieldType {
            /// Every catalog entry in declaration order.
            pub const ALL: &'static [FieldType] = &[$(FieldType::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(FieldType::$variant => $id),+
                }
            }
        }

        impl FromStr for FieldType {
            type Err = CoreError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($id => Ok(FieldType::$variant),)+
                    other => Err(CoreError::UnknownFieldType(other.to_string())),
                }
            }
        }
    };
}

field_catalog! {
    FirstName => "firstName",
    MiddleName => "middleName",
    LastName => "lastName",
    FullName => "fullName",
    PreferredName => "preferredName",
    Email => "email",
    Phone => "phone",
    Address => "address",
    AddressLine2 => "addressLine2",
    City => "city",
    State => "state",
    PostalCode => "postalCode",
    Country => "country",
    DateOfBirth => "dateOfBirth",
    Nationality => "nationality",
    Pronouns => "pronouns",
    Linkedin => "linkedin",
    Github => "github",
    Website => "website",
    CurrentCompany => "currentCompany",
    CurrentTitle => "currentTitle",
    JobTitle => "jobTitle",
    YearsOfExperience => "yearsOfExperience",
    NoticePeriod => "noticePeriod",
    AvailableStartDate => "availableStartDate",
    ExpectedCompensation => "expectedCompensation",
    CurrentCompensation => "currentCompensation",
    SalaryCurrency => "salaryCurrency",
    School => "school",
    Degree => "degree",
    FieldOfStudy => "fieldOfStudy",
    GraduationYear => "graduationYear",
    Gpa => "gpa",
    Skills => "skills",
    Languages => "languages",
    Resume => "resume",
    CoverLetter => "coverLetter",
    WorkAuthorization => "workAuthorization",
    SponsorshipRequired => "sponsorshipRequired",
    WillingToRelocate => "willingToRelocate",
    HowDidYouHear => "howDidYouHear",
    Gender => "gender",
    Ethnicity => "ethnicity",
    VeteranStatus => "veteranStatus",
    DisabilityStatus => "disabilityStatus",
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_from_str() {
        for field in FieldType::ALL {
            assert_eq!(field.as_str().parse::<FieldType>().unwrap(), *field);
        }
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let err = "favouriteColour".parse::<FieldType>().unwrap_err();
        assert!(err.to_string().contains("favouriteColour"));
    }

    #[cfg(feature = "serde-full")]
    #[test]
    fn serde_name_matches_wire_identifier() {
        for field in FieldType::ALL {
            let json = serde_json::to_string(field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }
}
