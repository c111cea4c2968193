//! # JSON Options
//!
//! Controls how JSON payloads are decoded into request messages and how response messages
//! are rendered back to JSON.
//!
//! The defaults mirror a plain struct-to-JSON mapping rather than the strict protobuf JSON
//! mapping:
//!
//! * unknown fields in a request are ignored,
//! * responses use the field names from the `.proto` file,
//! * fields holding their default value are left out of responses,
//! * 64-bit integers are written as JSON numbers.
//!
//! Every option can be flipped with the builder methods.
use prost_reflect::{DeserializeOptions, DynamicMessage, ReflectMessage, SerializeOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    deny_unknown_fields: bool,
    use_proto_field_name: bool,
    skip_default_fields: bool,
    stringify_64_bit_integers: bool,
    use_enum_numbers: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            deny_unknown_fields: false,
            use_proto_field_name: true,
            skip_default_fields: true,
            stringify_64_bit_integers: false,
            use_enum_numbers: false,
        }
    }
}

impl JsonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject requests containing fields the message does not declare.
    pub fn deny_unknown_fields(mut self, yes: bool) -> Self {
        self.deny_unknown_fields = yes;
        self
    }

    /// Write `snake_case` names from the `.proto` file instead of `lowerCamelCase`.
    pub fn use_proto_field_name(mut self, yes: bool) -> Self {
        self.use_proto_field_name = yes;
        self
    }

    /// Leave fields holding their default value out of responses.
    pub fn skip_default_fields(mut self, yes: bool) -> Self {
        self.skip_default_fields = yes;
        self
    }

    /// Write 64-bit integers as JSON strings.
    pub fn stringify_64_bit_integers(mut self, yes: bool) -> Self {
        self.stringify_64_bit_integers = yes;
        self
    }

    /// Write enum values as numbers instead of their names.
    pub fn use_enum_numbers(mut self, yes: bool) -> Self {
        self.use_enum_numbers = yes;
        self
    }

    fn deserialize_options(&self) -> DeserializeOptions {
        DeserializeOptions::new().deny_unknown_fields(self.deny_unknown_fields)
    }

    fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new()
            .use_proto_field_name(self.use_proto_field_name)
            .skip_default_fields(self.skip_default_fields)
            .stringify_64_bit_integers(self.stringify_64_bit_integers)
            .use_enum_numbers(self.use_enum_numbers)
    }

    /// Decodes `payload` into `message`, replacing its previous contents.
    pub fn decode_str(
        &self,
        message: &mut DynamicMessage,
        payload: &str,
    ) -> Result<(), serde_json::Error> {
        let mut deserializer = serde_json::Deserializer::from_str(payload);
        let decoded = DynamicMessage::deserialize_with_options(
            message.descriptor(),
            &mut deserializer,
            &self.deserialize_options(),
        )?;
        deserializer.end()?;

        *message = decoded;
        Ok(())
    }

    /// Decodes an already parsed JSON value into `message`, replacing its previous contents.
    pub fn decode_value(
        &self,
        message: &mut DynamicMessage,
        value: serde_json::Value,
    ) -> Result<(), serde_json::Error> {
        *message = DynamicMessage::deserialize_with_options(
            message.descriptor(),
            value,
            &self.deserialize_options(),
        )?;
        Ok(())
    }

    /// A decode function for [`crate::invoke_with`] reading a JSON string.
    pub fn decoder(
        self,
        payload: &str,
    ) -> impl FnOnce(&mut DynamicMessage) -> Result<(), serde_json::Error> + '_ {
        move |message| self.decode_str(message, payload)
    }

    /// A decode function for [`crate::invoke_with`] reading a parsed JSON value.
    pub fn value_decoder(
        self,
        value: serde_json::Value,
    ) -> impl FnOnce(&mut DynamicMessage) -> Result<(), serde_json::Error> {
        move |message| self.decode_value(message, value)
    }

    pub fn encode(&self, message: &DynamicMessage) -> Result<serde_json::Value, serde_json::Error> {
        message.serialize_with_options(serde_json::value::Serializer, &self.serialize_options())
    }

    pub fn encode_to_string(&self, message: &DynamicMessage) -> Result<String, serde_json::Error> {
        let value = self.encode(message)?;
        serde_json::to_string(&value)
    }
}
