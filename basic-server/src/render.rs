//! Handlebars rendering of pages and tags

use async_trait::async_trait;
use handlebars::Handlebars;
use serde_json::json;

use trellis::prelude::*;
use trellis::record::{FieldValue, Record};
use trellis::render_adapter::RenderAdapter;

const TEMPLATES: &[(&str, &str)] = &[
	("full", "<article class=\"{{type}}\"><h1>{{title}}</h1><div>{{body}}</div></article>"),
	("teaser", "<section class=\"{{type}}\"><h2>{{title}}</h2></section>"),
	("raw", "{{body}}"),
	(
		"edit",
		"<form method=\"post\"><input name=\"title\" value=\"{{title}}\"><textarea name=\"body\">{{body}}</textarea></form>",
	),
	("delete", "<form method=\"post\"><p>Delete {{type}} \"{{title}}\"?</p></form>"),
];

fn text(value: FieldValue) -> String {
	match value {
		FieldValue::Null => String::new(),
		FieldValue::Bool(b) => b.to_string(),
		FieldValue::Int(i) => i.to_string(),
		FieldValue::Real(r) => r.to_string(),
		FieldValue::Text(s) => s.into(),
	}
}

#[derive(Debug)]
pub struct HandlebarsRender {
	handlebars: Handlebars<'static>,
}

impl HandlebarsRender {
	pub fn new() -> ClResult<Self> {
		let mut handlebars = Handlebars::new();
		for (mode, template) in TEMPLATES {
			handlebars
				.register_template_string(mode, template)
				.map_err(|err| Error::ConfigError(format!("template '{}': {}", mode, err)))?;
		}
		Ok(Self { handlebars })
	}
}

#[async_trait]
impl RenderAdapter for HandlebarsRender {
	async fn render(&self, resource_type: &str, record: &Record, mode: &str) -> ClResult<String> {
		let title = match record.value("title") {
			FieldValue::Null => text(record.value("name")),
			title => text(title),
		};
		let vars = json!({
			"type": resource_type,
			"id": record.id,
			"title": title,
			"body": text(record.value("body")),
		});
		self.handlebars.render(mode, &vars).map_err(|err| {
			warn!("Cannot render {} {} as {}: {}", resource_type, record.id, mode, err);
			Error::Internal(format!("no template for mode '{}'", mode))
		})
	}
}


// vim: ts=4
