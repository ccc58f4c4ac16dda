//! Template rendering for generated Java sources.

use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, no_escape,
};
use metagen_core::naming::{java_class_name, java_constant};
use serde_json::Value;

use crate::errors::GenerationError;

pub const DOMAIN_TYPE_TEMPLATE: &str = "domain-type";
pub const TEST_DOMAIN_TYPE_TEMPLATE: &str = "test-domain-type";
pub const PROCESS_TEMPLATE: &str = "process";
pub const VIEW_TEMPLATE: &str = "view";
pub const DOMAIN_TEMPLATE: &str = "domain";
pub const TEST_DOMAIN_TEMPLATE: &str = "test-domain";
pub const PROCESS_DOMAIN_TEMPLATE: &str = "process-domain";

const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (DOMAIN_TYPE_TEMPLATE, include_str!("../templates/domain-type.hbs")),
    (TEST_DOMAIN_TYPE_TEMPLATE, include_str!("../templates/test-domain-type.hbs")),
    (PROCESS_TEMPLATE, include_str!("../templates/process.hbs")),
    (VIEW_TEMPLATE, include_str!("../templates/view.hbs")),
    (DOMAIN_TEMPLATE, include_str!("../templates/domain.hbs")),
    (TEST_DOMAIN_TEMPLATE, include_str!("../templates/test-domain.hbs")),
    (PROCESS_DOMAIN_TEMPLATE, include_str!("../templates/process-domain.hbs")),
];

/// Renders a template id with a JSON context into source text.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template_id: &str, context: &Value) -> Result<String, GenerationError>;
}

/// Handlebars renderer with the built-in Java templates registered.
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Result<Self, GenerationError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("upper", Box::new(upper_helper));
        handlebars.register_helper("lower", Box::new(lower_helper));
        handlebars.register_helper("constant", Box::new(constant_helper));
        handlebars.register_helper("class_name", Box::new(class_name_helper));

        for (name, source) in EMBEDDED_TEMPLATES {
            handlebars
                .register_template_string(name, *source)
                .map_err(Box::new)?;
        }

        Ok(Self { handlebars })
    }

    /// Register or replace a template.
    pub fn register_template(&mut self, name: &str, source: &str) -> Result<(), GenerationError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(Box::new)?;
        Ok(())
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template_id: &str, context: &Value) -> Result<String, GenerationError> {
        self.handlebars
            .render(template_id, context)
            .map_err(|err| GenerationError::Render {
                template: template_id.to_string(),
                reason: err.to_string(),
            })
    }
}

// Handlebars helpers

fn string_param<'a>(h: &'a Helper) -> &'a str {
    h.param(0).and_then(|v| v.value().as_str()).unwrap_or("")
}

fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&string_param(h).to_uppercase())?;
    Ok(())
}

fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&string_param(h).to_lowercase())?;
    Ok(())
}

fn constant_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&java_constant(string_param(h)))?;
    Ok(())
}

fn class_name_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&java_class_name(string_param(h)))?;
    Ok(())
}
