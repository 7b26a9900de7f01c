use std::fmt;

use anyhow::Error;
use thiserror::Error as ErrorDerive;

#[derive(Debug, ErrorDerive)]
pub enum ConfigLoadError {
    /// Field names and messages of all failed checks.
    CheckErrors(Vec<(String, String)>),
    Other(#[from] Error),
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(err) => write!(f, "Configuration error: {err}")?,
            Self::CheckErrors(errors) => {
                write!(f, "Configuration validation error(s):")?;
                for err in errors {
                    write!(f, "\n  - {}", err.1)?;
                }
            }
        }

        Ok(())
    }
}

/// Bundles configuration sections neatly into a single struct.
///
/// The most important part is the generated `load` method which loads the
/// configuration from a file, validates all sections and converts them to
/// their final data structures.
///
/// - `name` is the name of the section and of the field in the
///   `Configuration` struct
/// - `type_into` is the final data structure, it must implement
///   `From<type_from>`
/// - `type_from` is the deserialized section, it must implement `Default`
///   and a `check` method returning all failed checks
macro_rules! bundle_config {
    ($($name:ident : $type_into:ty : $type_from:ty),*) => {
        #[derive(bevy::prelude::Resource, Debug, Clone)]
        pub struct Configuration {
            $(
                $name: $type_into,
            )*
        }

        #[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default)]
        #[serde(default, deny_unknown_fields)]
        pub struct RawConfiguration {
            $(
                $name: $type_from,
            )*
        }

        impl RawConfiguration {
            /// Runs checks of all sections and reports all failures
            /// together.
            pub fn check(&self) -> Result<(), $crate::ConfigLoadError> {
                let mut errors = Vec::new();
                $(
                    if let Err(section_errors) = self.$name.check() {
                        for (field, message) in section_errors {
                            bevy::prelude::trace!("Failed check of {}.{}", stringify!($name), field);
                            errors.push((
                                format!("{}.{}", stringify!($name), field),
                                message,
                            ));
                        }
                    }
                )*

                if errors.is_empty() {
                    Ok(())
                } else {
                    Err($crate::ConfigLoadError::CheckErrors(errors))
                }
            }
        }

        impl TryFrom<RawConfiguration> for Configuration {
            type Error = $crate::ConfigLoadError;

            fn try_from(raw: RawConfiguration) -> Result<Self, Self::Error> {
                raw.check()?;
                Ok(Self {
                    $(
                        $name: raw.$name.into(),
                    )*
                })
            }
        }

        impl Configuration {
            $(
                pub fn $name(&self) -> &$type_into {
                    &self.$name
                }
            )*

            /// Loads and validates configuration from a YAML file. Defaults
            /// are used if the file does not exist.
            pub async fn load(
                path: &async_std::path::Path,
            ) -> Result<Self, $crate::ConfigLoadError> {
                match $crate::io::load_conf_text(path).await? {
                    Some(text) => Self::from_yaml(text.as_str()),
                    None => Ok(Self::default()),
                }
            }

            pub fn from_yaml(text: &str) -> Result<Self, $crate::ConfigLoadError> {
                use anyhow::Context;

                let raw: RawConfiguration = serde_yaml::from_str(text)
                    .context("Failed to parse Sentinel configuration")?;
                bevy::prelude::debug!(
                    "Loaded raw configuration: {:?}",
                    raw
                );
                raw.try_into()
            }
        }

        impl Default for Configuration {
            fn default() -> Self {
                Self {
                    $(
                        $name: <$type_from>::default().into(),
                    )*
                }
            }
        }
    };
}
