//! Manifest file entries

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of artifact a manifest entry materializes
///
/// Unknown kinds are kept as `Other` so the manifest still loads and the
/// install fails with an unsupported-type error naming the entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileType {
    File,
    Dir,
    Template,
    Other(String),
}

impl FileType {
    pub fn as_str(&self) -> &str {
        match self {
            FileType::File => "file",
            FileType::Dir => "dir",
            FileType::Template => "template",
            FileType::Other(other) => other,
        }
    }

    /// Whether the materialized artifact is a regular file with a content hash
    pub fn is_file_like(&self) -> bool {
        matches!(self, FileType::File | FileType::Template)
    }
}

impl From<&str> for FileType {
    fn from(value: &str) -> Self {
        match value {
            "file" => FileType::File,
            "dir" => FileType::Dir,
            "template" => FileType::Template,
            other => FileType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for FileType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FileType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(FileType::from(value.as_str()))
    }
}

/// Whether an artifact is removed once it is no longer wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    Keep,
    Delete,
}

impl DeletePolicy {
    /// Directories are kept by default since they often hold state written by
    /// other software; everything else is deleted.
    pub fn default_for(file_type: &FileType) -> Self {
        match file_type {
            FileType::Dir => DeletePolicy::Keep,
            _ => DeletePolicy::Delete,
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletePolicy::Keep => f.pad("keep"),
            DeletePolicy::Delete => f.pad("delete"),
        }
    }
}

/// Permission bits; zero means "leave unchanged"
///
/// Accepts an integer (`420`) or an octal string (`"0644"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode(pub u32);

impl Mode {
    pub fn is_set(self) -> bool {
        self.0 != 0
    }

    /// Permission bits only
    pub fn bits(self) -> u32 {
        self.0 & 0o7777
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.bits())
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ModeVisitor;

        impl Visitor<'_> for ModeVisitor {
            type Value = Mode;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer or an octal string such as \"0644\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Mode, E> {
                u32::try_from(value)
                    .map(Mode)
                    .map_err(|_| E::custom(format!("mode {value} is out of range")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Mode, E> {
                u32::try_from(value)
                    .map(Mode)
                    .map_err(|_| E::custom(format!("mode {value} is out of range")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Mode, E> {
                let digits = value.trim_start_matches("0o");
                u32::from_str_radix(digits, 8)
                    .map(Mode)
                    .map_err(|_| E::custom(format!("'{value}' is not an octal mode")))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Mode, E> {
                Ok(Mode::default())
            }
        }

        deserializer.deserialize_any(ModeVisitor)
    }
}

/// One manifest entry describing an artifact to materialize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(rename = "type")]
    pub file_type: FileType,

    /// Path relative to the source root
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub src: String,

    /// Path relative to the destination root
    #[serde(default)]
    pub dest: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,

    #[serde(default)]
    pub mode: Mode,

    /// Unset until the manifest is loaded, then always the resolved policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_policy: Option<DeletePolicy>,
}

impl File {
    /// The delete policy, falling back to the type default when unset
    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
            .unwrap_or_else(|| DeletePolicy::default_for(&self.file_type))
    }
}
