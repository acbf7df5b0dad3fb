//! Type definitions for table and field descriptors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Describes one managed table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDescriptor {
    /// Path of the record type this descriptor was derived from
    #[serde(default)]
    pub owner: String,
    pub table_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default = "default_true")]
    pub check: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub indices: Vec<CompositeIndexSpec>,
}

impl TableDescriptor {
    /// Create a new table descriptor owned by the given record type
    pub fn new(owner: &str, table_name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            table_name: table_name.to_string(),
            comment: String::new(),
            charset: None,
            check: true,
            fields: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Set the table comment
    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    /// Set the table character set
    pub fn charset(mut self, charset: &str) -> Self {
        self.charset = Some(charset.to_string());
        self
    }

    /// Set whether this table takes part in synchronization
    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Append a field
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a table-level composite index
    pub fn index(mut self, index: CompositeIndexSpec) -> Self {
        self.indices.push(index);
        self
    }

    /// Fields marked as primary key, in declaration order
    pub fn primary_key_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.primary_key.is_some())
    }
}

/// Describes one managed column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDescriptor {
    /// Name of the record member backing this column
    pub member: String,
    /// Explicit column name, overriding the one derived from `member`
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    #[serde(default, rename = "kind")]
    pub value_kind: ValueKind,
    #[serde(default = "default_length")]
    pub length: u32,
    #[serde(default = "default_decimal_length")]
    pub decimal_length: u32,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default = "default_numeric_value")]
    pub default_value: i64,
    #[serde(default)]
    pub default_str: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub index: Option<IndexSpec>,
    #[serde(default)]
    pub primary_key: Option<PrimaryKeySpec>,
}

impl FieldDescriptor {
    /// Create a new field for a record member of the given value kind
    pub fn new(member: &str, value_kind: ValueKind) -> Self {
        Self {
            member: member.to_string(),
            name: None,
            field_type: FieldType::Auto,
            value_kind,
            length: default_length(),
            decimal_length: default_decimal_length(),
            nullable: true,
            unsigned: false,
            default_value: default_numeric_value(),
            default_str: None,
            comment: String::new(),
            index: None,
            primary_key: None,
        }
    }

    /// Set an explicit column name
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Declare an explicit column type instead of inferring one
    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.field_type = FieldType::Explicit(column_type);
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn decimal_length(mut self, decimal_length: u32) -> Self {
        self.decimal_length = decimal_length;
        self
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    /// Set the numeric default, used when no string default is given
    pub fn default_value(mut self, value: i64) -> Self {
        self.default_value = value;
        self
    }

    /// Set the string default
    pub fn default_str(mut self, value: &str) -> Self {
        self.default_str = Some(value.to_string());
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    /// Attach an inline index to this column
    pub fn index(mut self, index: IndexSpec) -> Self {
        self.index = Some(index);
        self
    }

    /// Mark this column as the table's primary key
    pub fn primary_key(mut self, auto_increment: bool) -> Self {
        self.primary_key = Some(PrimaryKeySpec { auto_increment });
        self
    }

    /// The string default, if a non-empty one was supplied
    pub fn string_default(&self) -> Option<&str> {
        self.default_str.as_deref().filter(|s| !s.is_empty())
    }
}

/// Primary key marker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrimaryKeySpec {
    #[serde(default = "default_true")]
    pub auto_increment: bool,
}

/// Single-column index declared on a field
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexSpec {
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub name: Option<String>,
}

impl IndexSpec {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn unique() -> Self {
        Self {
            unique: true,
            name: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Multi-column index declared on the table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompositeIndexSpec {
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub name: Option<String>,
    /// Raw column names, used as-is
    #[serde(default)]
    pub columns: Vec<String>,
    /// Member names, resolved to column names
    #[serde(default)]
    pub fields: Vec<String>,
}

impl CompositeIndexSpec {
    /// Index over raw column names
    pub fn on_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Index over record members
    pub fn on_fields(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Semantic tag for the value type of a record member
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    DateTime,
    Blob,
    String,
    #[default]
    Other,
}

/// Declared column type of a field
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    /// Inferred from the member's value kind
    #[default]
    Auto,
    Explicit(ColumnType),
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(FieldType::Auto)
        } else {
            s.parse().map(FieldType::Explicit)
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Auto => "auto".to_string(),
            FieldType::Explicit(ty) => ty.keyword().to_lowercase(),
        }
    }
}

/// Concrete MySQL column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bigint,
    Integer,
    Tinyint,
    Smallint,
    Float,
    Double,
    Decimal,
    Varchar,
    Text,
    Tinytext,
    Mediumtext,
    Longtext,
    Date,
    Datetime,
    Time,
    Timestamp,
    Blob,
}

impl ColumnType {
    /// SQL keyword for this type
    pub fn keyword(self) -> &'static str {
        match self {
            ColumnType::Bigint => "BIGINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Tinyint => "TINYINT",
            ColumnType::Smallint => "SMALLINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Text => "TEXT",
            ColumnType::Tinytext => "TINYTEXT",
            ColumnType::Mediumtext => "MEDIUMTEXT",
            ColumnType::Longtext => "LONGTEXT",
            ColumnType::Date => "DATE",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Time => "TIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Blob => "BLOB",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ColumnType::Bigint | ColumnType::Integer | ColumnType::Tinyint | ColumnType::Smallint
        )
    }

    pub fn is_char(self) -> bool {
        matches!(
            self,
            ColumnType::Varchar
                | ColumnType::Text
                | ColumnType::Tinytext
                | ColumnType::Mediumtext
                | ColumnType::Longtext
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "bigint" => ColumnType::Bigint,
            "integer" | "int" => ColumnType::Integer,
            "tinyint" => ColumnType::Tinyint,
            "smallint" => ColumnType::Smallint,
            "float" => ColumnType::Float,
            "double" => ColumnType::Double,
            "decimal" => ColumnType::Decimal,
            "varchar" => ColumnType::Varchar,
            "text" => ColumnType::Text,
            "tinytext" => ColumnType::Tinytext,
            "mediumtext" => ColumnType::Mediumtext,
            "longtext" => ColumnType::Longtext,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::Datetime,
            "time" => ColumnType::Time,
            "timestamp" => ColumnType::Timestamp,
            "blob" => ColumnType::Blob,
            other => {
                return Err(Error::ConfigError(format!("Unknown column type: {}", other)));
            }
        };
        Ok(ty)
    }
}

fn default_true() -> bool {
    true
}

fn default_length() -> u32 {
    255
}

fn default_decimal_length() -> u32 {
    2
}

fn default_numeric_value() -> i64 {
    -1
}
