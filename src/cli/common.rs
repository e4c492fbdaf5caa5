//! Common CLI types shared across commands

use clap::{Args, ValueEnum};

use crate::directory::identifier::{IdKind, IdSelectors};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table (default)
    Table,
    /// Comma-separated values
    Csv,
    /// JSON array
    Json,
    /// YAML format
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Feishu id space on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IdType {
    /// Tenant-wide id (department_id / user_id)
    #[default]
    Id,
    /// App-scoped open id (open_department_id / open_id)
    Openid,
}

impl From<IdType> for IdKind {
    fn from(value: IdType) -> Self {
        match value {
            IdType::Id => IdKind::Stable,
            IdType::Openid => IdKind::Scoped,
        }
    }
}

/// `--dt` / `--ut` id space selectors
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct IdTypeArgs {
    /// Department id type
    #[arg(long = "dt", value_enum, default_value_t = IdType::Id)]
    pub department_id_type: IdType,

    /// User id type
    #[arg(long = "ut", value_enum, default_value_t = IdType::Id)]
    pub user_id_type: IdType,
}

impl IdTypeArgs {
    pub fn selectors(&self) -> IdSelectors {
        IdSelectors::new(self.department_id_type.into(), self.user_id_type.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn test_id_type_into_kind() {
        assert_eq!(IdKind::from(IdType::Id), IdKind::Stable);
        assert_eq!(IdKind::from(IdType::Openid), IdKind::Scoped);

        let args = IdTypeArgs {
            department_id_type: IdType::Openid,
            user_id_type: IdType::Id,
        };
        assert_eq!(
            args.selectors(),
            IdSelectors::new(IdKind::Scoped, IdKind::Stable)
        );
    }
}
