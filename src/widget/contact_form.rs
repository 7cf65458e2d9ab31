use super::{
	attributes, escape_attribute, escape_text, form,
	reflect::{display, is_truthy},
	validators, Blocks, Component, Config, Form, Properties,
};
use crate::{host::Host, Error};
use core::{any::Any, time::Duration};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Outcome of [`ContactForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
	pub is_valid: bool,
	pub error_fields: Vec<String>,
}

/// A `POST` the embedder should perform, then report back through [`ContactForm::complete_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
	pub action: String,
	/// JSON text of the form data.
	pub body: String,
}

/// `my-form`: a validated contact form with `fio`, `email` and `phone` fields.
#[derive(Debug, Clone)]
pub struct ContactForm {
	form: Form,
}

impl ContactForm {
	pub const TAG: &'static str = "my-form";

	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self { form: Form::new(config) }
	}

	/// Validates each field of `data`.
	///
	/// # Errors
	///
	/// Iff a field has no validator.
	pub fn validate(data: &Properties) -> Result<Validation, Error> {
		let mut error_fields = Vec::new();
		for (name, value) in data {
			let validator = validators::for_field(name).ok_or_else(|| Error::MissingValidator(name.clone()))?;
			if !validator(&display(value)) {
				error_fields.push(name.clone());
			}
		}
		Ok(Validation { is_valid: error_fields.is_empty(), error_fields })
	}

	/// Clears previous errors and results, stores the serialized form as `data` and validates it.
	///
	/// Returns the request to perform if the data is valid, otherwise records `errorFields`.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget or a field has no validator.
	#[instrument(skip(blocks, host))]
	pub fn submit<H: Host>(blocks: &mut Blocks<H>, host: &mut H, element: &H::Node) -> Result<Option<SaveRequest>, Error> {
		blocks.set_property(host, element, "errorFields", json!([]))?;
		blocks.set_property(host, element, "result", json!({}))?;
		let data = form::serialize(&*host, element);
		blocks.set_property(host, element, "data", Value::Object(data.clone()))?;

		let validation = Self::validate(&data)?;
		if validation.is_valid {
			Self::save(blocks, host, element, &data).map(Some)
		} else {
			debug!(fields = ?validation.error_fields, "Invalid form data.");
			blocks.set_property(host, element, "errorFields", json!(validation.error_fields))?;
			Ok(None)
		}
	}

	/// Marks the form as in progress and returns the request that saves `data`.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn save<H: Host>(blocks: &mut Blocks<H>, host: &mut H, element: &H::Node, data: &Properties) -> Result<SaveRequest, Error> {
		blocks.set_property(host, element, "progress", json!(true))?;
		let action = display(&blocks.property(host, element, "action")?);
		Ok(SaveRequest { action, body: Value::Object(data.clone()).to_string() })
	}

	/// Records the outcome of a [`SaveRequest`].
	///
	/// A response with `"status": "progress"` asks for the form to be submitted again after the returned delay.
	/// A transport error becomes an `error` result and leaves the form in progress.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn complete_save<H: Host>(blocks: &mut Blocks<H>, host: &mut H, element: &H::Node, response: Result<Value, String>) -> Result<Option<Duration>, Error> {
		match response {
			Ok(result) => {
				let retry = match (result.get("status").and_then(Value::as_str), result.get("timeout")) {
					(Some("progress"), timeout) => Some(Duration::from_millis(timeout.and_then(Value::as_u64).unwrap_or(0))),
					_ => None,
				};
				blocks.set_property(host, element, "result", result)?;
				blocks.set_property(host, element, "progress", json!(false))?;
				Ok(retry)
			}
			Err(reason) => {
				blocks.set_property(host, element, "result", json!({ "status": "error", "reason": reason }))?;
				blocks.set_property(host, element, "progress", json!(true))?;
				Ok(None)
			}
		}
	}

	#[must_use]
	pub fn get_data<H: Host>(host: &H, element: &H::Node) -> Properties {
		form::serialize(host, element)
	}

	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn set_data<H: Host>(blocks: &mut Blocks<H>, host: &mut H, element: &H::Node, data: Properties) -> Result<(), Error> {
		blocks.set_property(host, element, "data", Value::Object(data))
	}
}

fn field(name: &str, label: &str, data: &Value, error_fields: &Value) -> String {
	let has_error = error_fields.as_array().map_or(false, |fields| fields.iter().any(|field| field.as_str() == Some(name)));
	format!(
		"
		<div>
			<b-input-text {}></b-input-text>
		</div>",
		attributes(&[
			("name", json!(name)),
			("value", data.get(name).cloned().unwrap_or(Value::Null)),
			("label", json!(label)),
			("error", json!(has_error)),
		])
	)
}

impl Component for ContactForm {
	fn tag_name(&self) -> &'static str {
		Self::TAG
	}

	fn reflected_properties(&self) -> Vec<(&'static str, Value)> {
		let mut properties = vec![("errorFields", json!([])), ("data", json!({})), ("result", json!({})), ("progress", json!(false))];
		properties.extend(self.form.reflected_properties());
		properties
	}

	fn template(&self, properties: &Properties) -> String {
		let property = |name: &str| properties.get(name).cloned().unwrap_or(Value::Null);
		let (data, error_fields, result, progress) = (property("data"), property("errorFields"), property("result"), property("progress"));
		let status = result.get("status").map(display).unwrap_or_default();

		let message = match status.as_str() {
			"success" => "Success".to_owned(),
			"error" => escape_text(&result.get("reason").map(display).unwrap_or_default()),
			"progress" => format!("Repeat in {} ms", result.get("timeout").map(display).unwrap_or_default()),
			_ => String::new(),
		};

		format!(
			"
	<form id='myForm'>{fio}{email}{phone}
		<div>
			<b-button {button} id='submitButton'>Save</b-button>
			<div id='resultContainer' class=\"{status}\">{message}</div>
		</div>
	</form>
",
			fio = field("fio", "ФИО", &data, &error_fields),
			email = field("email", "Email", &data, &error_fields),
			phone = field("phone", "Phone", &data, &error_fields),
			button = attributes(&[("disabled", json!(is_truthy(&progress)))]),
			status = escape_attribute(&status),
			message = message,
		)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
