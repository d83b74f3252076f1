//! Table entity inputs and their JSON bodies.
//!
//! Three kinds of input can be written to the table service:
//!
//! - [`MapTableEntity`]: free form properties.
//! - [`StructTableEntity`]: a [`serde::Serialize`] record described by an [`EntitySchema`].
//! - [`MarshaledTableEntity`]: a value that renders its own JSON.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use azstore_core::{Error, Result};
use bytes::Bytes;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::constants::ODATA_TYPE_SUFFIX;

mod sealed {
    pub trait Sealed {}
}

/// TableEntity is a value that can be sent as the body of an entity write.
///
/// This trait is sealed, see [`MapTableEntity`], [`StructTableEntity`] and
/// [`MarshaledTableEntity`].
pub trait TableEntity: sealed::Sealed {
    /// Render the entity into its JSON body.
    fn to_json(&self) -> Result<Vec<u8>>;
}

/// Entity data model types understood by the table service.
///
/// String and 32-bit integer properties need no annotation, other types are
/// sent as JSON strings with an `<name>@odata.type` sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmType {
    /// `Edm.Binary`
    Binary,
    /// `Edm.Boolean`
    Boolean,
    /// `Edm.DateTime`
    DateTime,
    /// `Edm.Double`
    Double,
    /// `Edm.Guid`
    Guid,
    /// `Edm.Int32`
    Int32,
    /// `Edm.Int64`
    Int64,
    /// `Edm.String`
    String,
}

impl EdmType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdmType::Binary => "Edm.Binary",
            EdmType::Boolean => "Edm.Boolean",
            EdmType::DateTime => "Edm.DateTime",
            EdmType::Double => "Edm.Double",
            EdmType::Guid => "Edm.Guid",
            EdmType::Int32 => "Edm.Int32",
            EdmType::Int64 => "Edm.Int64",
            EdmType::String => "Edm.String",
        }
    }
}

impl Display for EdmType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdmType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let v = match s {
            "Edm.Binary" => EdmType::Binary,
            "Edm.Boolean" => EdmType::Boolean,
            "Edm.DateTime" => EdmType::DateTime,
            "Edm.Double" => EdmType::Double,
            "Edm.Guid" => EdmType::Guid,
            "Edm.Int32" => EdmType::Int32,
            "Edm.Int64" => EdmType::Int64,
            "Edm.String" => EdmType::String,
            v => {
                return Err(Error::serialization_failed(format!(
                    "storage: unknown odata type: {v}"
                )))
            }
        };
        Ok(v)
    }
}

/// MapTableEntity describes an entity as free form properties.
///
/// Values must be JSON literals, not objects or arrays. Types are declared
/// with explicit `<name>@odata.type` entries.
///
/// ```
/// use azstore::{EdmType, MapTableEntity};
///
/// let entity = MapTableEntity::new()
///     .with_property("PartitionKey", "mypartitionkey")
///     .with_property("RowKey", "myrowkey")
///     .with_property("Address", "Mountain View")
///     .with_typed_property("Age", "255", EdmType::Int64);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapTableEntity(BTreeMap<String, Value>);

impl MapTableEntity {
    /// Create an empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterate over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties, sidecars included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the entity has no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a property together with its `@odata.type` sidecar.
    pub fn with_typed_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        odata_type: EdmType,
    ) -> Self {
        let key = key.into();
        self.insert(format!("{key}{ODATA_TYPE_SUFFIX}"), odata_type.as_str());
        self.insert(key, value);
        self
    }
}

impl From<BTreeMap<String, Value>> for MapTableEntity {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

impl From<HashMap<String, Value>> for MapTableEntity {
    fn from(value: HashMap<String, Value>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl From<serde_json::Map<String, Value>> for MapTableEntity {
    fn from(value: serde_json::Map<String, Value>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapTableEntity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl sealed::Sealed for MapTableEntity {}

impl TableEntity for MapTableEntity {
    fn to_json(&self) -> Result<Vec<u8>> {
        ensure_flat(&self.0)?;
        to_sorted_json(&self.0)
    }
}

/// FieldDescriptor declares how one record field is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    field_name: String,
    serialized_name: Option<String>,
    odata_type: Option<EdmType>,
}

impl FieldDescriptor {
    /// Describe the field serde emits as `field_name`.
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            serialized_name: None,
            odata_type: None,
        }
    }

    /// Send the field under another property name.
    pub fn with_serialized_name(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    /// Annotate the field with an `@odata.type` sidecar.
    pub fn with_odata_type(mut self, odata_type: EdmType) -> Self {
        self.odata_type = Some(odata_type);
        self
    }

    /// Name the field is emitted as by serde.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Property name on the wire: the serialized name if set, else the field name.
    pub fn resolved_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.field_name)
    }

    /// Declared odata type.
    pub fn odata_type(&self) -> Option<EdmType> {
        self.odata_type
    }
}

/// EntitySchema lists the field descriptors of one record type.
///
/// Build it once per type, for example in a `static` behind `once_cell::sync::Lazy`,
/// and hand it out from [`DescribeEntity::entity_schema`].
///
/// ```
/// use azstore::{EdmType, EntitySchema, FieldDescriptor};
///
/// let schema = EntitySchema::new()
///     .field(FieldDescriptor::new("Name").with_serialized_name("name"))
///     .typed_field("Id", EdmType::Guid);
/// assert_eq!(schema.fields().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySchema {
    fields: Vec<FieldDescriptor>,
}

impl EntitySchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field descriptor.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a field that only carries an odata type.
    pub fn typed_field(self, field_name: impl Into<String>, odata_type: EdmType) -> Self {
        self.field(FieldDescriptor::new(field_name).with_odata_type(odata_type))
    }

    /// All declared fields.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// DescribeEntity is implemented by record types that carry a static schema.
pub trait DescribeEntity: Serialize {
    /// Schema of this record type.
    fn entity_schema() -> &'static EntitySchema;
}

/// StructTableEntity describes an entity as a serde record plus its schema.
///
/// The record is serialized with serde, declared renames and `@odata.type`
/// sidecars are merged in, and the result is written with sorted keys.
#[derive(Debug, Clone)]
pub struct StructTableEntity<'s, T> {
    value: Option<T>,
    schema: &'s EntitySchema,
}

impl<'s, T: Serialize> StructTableEntity<'s, T> {
    /// Create an entity from a record and its schema.
    pub fn new(value: T, schema: &'s EntitySchema) -> Self {
        Self::from_option(Some(value), schema)
    }

    /// Create an entity from a record that may be absent.
    ///
    /// Serializing an absent record fails.
    pub fn from_option(value: Option<T>, schema: &'s EntitySchema) -> Self {
        Self { value, schema }
    }
}

impl<T: DescribeEntity> StructTableEntity<'static, T> {
    /// Create an entity from a record type carrying its own schema.
    pub fn from_record(value: T) -> Self {
        Self::new(value, T::entity_schema())
    }
}

impl<T> sealed::Sealed for StructTableEntity<'_, T> {}

impl<T: Serialize> TableEntity for StructTableEntity<'_, T> {
    fn to_json(&self) -> Result<Vec<u8>> {
        let Some(value) = self.value.as_ref() else {
            return Err(Error::serialization_failed(
                "storage: struct value for given StructTableEntity is absent",
            ));
        };

        let value = serde_json::to_value(value).map_err(|e| {
            Error::serialization_failed("storage: failed to serialize entity").with_source(e)
        })?;
        let Value::Object(object) = value else {
            return Err(Error::serialization_failed(
                "storage: value given to StructTableEntity is not a struct",
            ));
        };
        let mut m: BTreeMap<String, Value> = object.into_iter().collect();

        for field in self.schema.fields() {
            let resolved = field.resolved_name();
            if resolved != field.field_name() {
                if let Some(v) = m.remove(field.field_name()) {
                    m.insert(resolved.to_string(), v);
                }
            }

            if let Some(odata_type) = field.odata_type() {
                m.insert(
                    format!("{resolved}{ODATA_TYPE_SUFFIX}"),
                    Value::String(odata_type.as_str().to_string()),
                );
            }
        }

        ensure_flat(&m)?;
        to_sorted_json(&m)
    }
}

/// MarshalJson is implemented by values that render their own JSON.
pub trait MarshalJson {
    /// Render the JSON bytes.
    fn marshal_json(&self) -> Result<Vec<u8>>;
}

impl MarshalJson for String {
    fn marshal_json(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl MarshalJson for &str {
    fn marshal_json(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl MarshalJson for Vec<u8> {
    fn marshal_json(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }
}

impl MarshalJson for Bytes {
    fn marshal_json(&self) -> Result<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl MarshalJson for Value {
    fn marshal_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            Error::serialization_failed("storage: failed to serialize entity").with_source(e)
        })
    }
}

/// MarshaledTableEntity sends the output of [`MarshalJson`] as is.
///
/// No ordering, formatting or validation is applied.
#[derive(Debug, Clone)]
pub struct MarshaledTableEntity<M>(pub M);

impl<M> sealed::Sealed for MarshaledTableEntity<M> {}

impl<M: MarshalJson> TableEntity for MarshaledTableEntity<M> {
    fn to_json(&self) -> Result<Vec<u8>> {
        self.0.marshal_json()
    }
}

/// Entities are flat objects: every property must be a JSON literal.
fn ensure_flat(m: &BTreeMap<String, Value>) -> Result<()> {
    for (k, v) in m {
        if v.is_object() || v.is_array() {
            return Err(Error::serialization_failed(format!(
                "storage: entity property {k} is not a JSON literal value"
            )));
        }
    }
    Ok(())
}

/// Keys come out sorted, indented with one tab.
fn to_sorted_json(m: &BTreeMap<String, Value>) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    m.serialize(&mut ser).map_err(|e| {
        Error::serialization_failed("storage: failed to serialize entity").with_source(e)
    })?;
    Ok(buf)
}
