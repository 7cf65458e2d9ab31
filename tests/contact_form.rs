use block_dom::{
	host::Host,
	memory::{Document, NodeId},
	widget::{Blocks, Config, ContactForm, Input, Properties},
	Error,
};
use core::time::Duration;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn init() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

fn mount(document: &mut Document, blocks: &mut Blocks<Document>) -> NodeId {
	let body = document.body();
	document.set_inner_html(body, r#"<my-form action="/api/save"></my-form>"#).unwrap();
	assert_eq!(blocks.upgrade_tree(document, &body).unwrap(), 1);
	document.first_element_child(body).unwrap()
}

fn type_into(document: &mut Document, blocks: &mut Blocks<Document>, form: NodeId, name: &str, text: &str) {
	let input = document.query(form, "input", &[("name", name)]).unwrap();
	let widget = document.parent(input).unwrap();
	document.set_value(&input, text);
	Input::handle_key_up(blocks, document, &widget, &input, 65);
}

fn object(value: Value) -> Properties {
	match value {
		Value::Object(object) => object,
		_ => unreachable!(),
	}
}

fn result_container(document: &Document) -> NodeId {
	document.get_element_by_id("resultContainer").unwrap()
}

#[test]
fn renders_three_fields_and_a_button() {
	init();
	let mut document = Document::new();
	let mut blocks = Blocks::with_builtins(Config::default());
	let form = mount(&mut document, &mut blocks);

	for name in ["fio", "email", "phone"] {
		let input = document.query(form, "input", &[("name", name)]).unwrap();
		assert!(blocks.is_mounted(&document, &document.parent(input).unwrap()));
	}
	let button = document.get_element_by_id("submitButton").unwrap();
	assert!(blocks.is_mounted(&document, &button));
	assert_eq!(document.text_content(document.query(button, "button", &[]).unwrap()).trim(), "Save");
	assert_eq!(document.attribute(button, "disabled"), None);
}

#[test]
fn validation_reports_fields_in_order() {
	let data = object(json!({"fio": "Ivan", "email": "ivan@gmail.com", "phone": "+7(111)555-11-13"}));
	let validation = ContactForm::validate(&data).unwrap();
	assert_eq!(serde_json::to_value(&validation).unwrap(), json!({"isValid": false, "errorFields": ["fio", "email", "phone"]}));

	let data = object(json!({"fio": "Ivan Ivanovich Ivanov", "email": "ivan@ya.ru", "phone": "+7(111)555-11-11"}));
	assert!(ContactForm::validate(&data).unwrap().is_valid);

	let data = object(json!({"address": "Moscow"}));
	assert!(matches!(ContactForm::validate(&data), Err(Error::MissingValidator(field)) if field == "address"));
}

#[test]
fn invalid_submit_marks_the_fields() {
	init();
	let mut document = Document::new();
	let mut blocks = Blocks::with_builtins(Config::default());
	let form = mount(&mut document, &mut blocks);
	type_into(&mut document, &mut blocks, form, "fio", "Ivan");

	assert_eq!(ContactForm::submit(&mut blocks, &mut document, &form).unwrap(), None);
	blocks.flush(&mut document).unwrap();

	assert_eq!(blocks.property(&document, &form, "errorFields").unwrap(), json!(["fio", "email", "phone"]));
	let fio = document.parent(document.query(form, "input", &[("name", "fio")]).unwrap()).unwrap();
	assert_eq!(document.attribute(fio, "error"), Some(""));
	assert_eq!(document.attribute(fio, "value"), Some("Ivan"));
	assert_eq!(ContactForm::get_data(&document, &form)["fio"], json!("Ivan"));
}

#[test]
fn valid_submit_saves_and_shows_the_outcome() {
	init();
	let mut document = Document::new();
	let mut blocks = Blocks::with_builtins(Config::default());
	let form = mount(&mut document, &mut blocks);
	type_into(&mut document, &mut blocks, form, "fio", "Ivan Ivanovich Ivanov");
	type_into(&mut document, &mut blocks, form, "email", "ivan@yandex.ru");
	type_into(&mut document, &mut blocks, form, "phone", "+7(111)555-11-11");
	blocks.flush(&mut document).unwrap();

	let request = ContactForm::submit(&mut blocks, &mut document, &form).unwrap().unwrap();
	assert_eq!(request.action, "/api/save");
	assert_eq!(request.body, r#"{"fio":"Ivan Ivanovich Ivanov","email":"ivan@yandex.ru","phone":"+7(111)555-11-11"}"#);
	blocks.flush(&mut document).unwrap();
	let button = document.get_element_by_id("submitButton").unwrap();
	assert_eq!(document.attribute(button, "disabled"), Some(""));

	let retry = ContactForm::complete_save(&mut blocks, &mut document, &form, Ok(json!({"status": "progress", "timeout": 500}))).unwrap();
	blocks.flush(&mut document).unwrap();
	assert_eq!(retry, Some(Duration::from_millis(500)));
	assert_eq!(document.attribute(result_container(&document), "class"), Some("progress"));
	assert_eq!(document.text_content(result_container(&document)), "Repeat in 500 ms");
	assert_eq!(document.attribute(document.get_element_by_id("submitButton").unwrap(), "disabled"), None);

	let retry = ContactForm::complete_save(&mut blocks, &mut document, &form, Ok(json!({"status": "success"}))).unwrap();
	blocks.flush(&mut document).unwrap();
	assert_eq!(retry, None);
	assert_eq!(document.attribute(result_container(&document), "class"), Some("success"));
	assert_eq!(document.text_content(result_container(&document)), "Success");
}

#[test]
fn transport_errors_are_shown() {
	init();
	let mut document = Document::new();
	let mut blocks = Blocks::with_builtins(Config::default());
	let form = mount(&mut document, &mut blocks);

	ContactForm::complete_save(&mut blocks, &mut document, &form, Err("<timeout>".to_owned())).unwrap();
	blocks.flush(&mut document).unwrap();

	assert_eq!(document.attribute(result_container(&document), "class"), Some("error"));
	assert_eq!(document.text_content(result_container(&document)), "<timeout>");
	assert_eq!(blocks.property(&document, &form, "progress").unwrap(), json!(true));
}

#[test]
fn set_data_fills_the_fields() {
	init();
	let mut document = Document::new();
	let mut blocks = Blocks::with_builtins(Config::default());
	let form = mount(&mut document, &mut blocks);

	ContactForm::set_data(&mut blocks, &mut document, &form, object(json!({"fio": "A B C", "email": "a@ya.ru"}))).unwrap();
	blocks.flush(&mut document).unwrap();

	let data = ContactForm::get_data(&document, &form);
	assert_eq!(Value::Object(data), json!({"fio": "A B C", "email": "a@ya.ru", "phone": ""}));
}
