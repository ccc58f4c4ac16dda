//! Model handlers: one generated Java source per model.

use std::collections::BTreeSet;
use std::sync::Arc;

use metagen_core::{
    DomainTypeModel, HandlerType, Model, NamingStrategy, ProcessModel, ViewModel, parser_ids,
};
use metagen_parse::{ConvenienceMethod, ModelParser, component_query};
use serde_json::{Map, Value, json};

use crate::context::HandlerContext;
use crate::errors::GenerationError;
use crate::source::{JAVA_FILE_EXTENSION, SourceGenerator};
use crate::template::{
    DOMAIN_TYPE_TEMPLATE, PROCESS_TEMPLATE, TEST_DOMAIN_TYPE_TEMPLATE, VIEW_TEMPLATE,
};

pub const DOMAIN_SUB_PACKAGE: &str = "domain";
pub const PROCESS_SUB_PACKAGE: &str = "process";
pub const VIEW_SUB_PACKAGE: &str = "view";
pub const DEFAULT_VIEW_SUPER_CLASS: &str = "AbstractView";

/// Type class rendered for properties without any type information.
const UNTYPED_PROPERTY_CLASS: &str = "Object";

/// Generation capability of a parser group.
pub trait ModelHandler: Send + Sync {
    /// Id of the parser whose models this handler generates.
    fn parser_id(&self) -> &'static str;

    /// Selects the target tree.
    fn handler_type(&self) -> HandlerType;

    /// Generate the artifacts of one model, returning how many were written.
    fn handle(
        &self,
        context: &HandlerContext,
        model: &Model,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError>;
}

/// Resolve the generation capability of a registered parser.
pub fn handler_for(parser: &dyn ModelParser) -> Option<Arc<dyn ModelHandler>> {
    let handler: Arc<dyn ModelHandler> = match parser.id() {
        parser_ids::DOMAIN_TYPE => Arc::new(DomainTypeHandler::source()),
        parser_ids::EXTERNAL_DOMAIN_TYPE => Arc::new(DomainTypeHandler::external()),
        parser_ids::TEST_DOMAIN_TYPE => Arc::new(DomainTypeHandler::test()),
        parser_ids::TEST_EXTERNAL_DOMAIN_TYPE => Arc::new(DomainTypeHandler::test_external()),
        parser_ids::PROCESS => Arc::new(ProcessHandler),
        parser_ids::VIEW => Arc::new(ViewHandler::new(
            parser
                .setting(parser_ids::CONFIG_KEY_EXTENDS_CLASS)
                .unwrap_or(DEFAULT_VIEW_SUPER_CLASS),
        )),
        _ => return None,
    };
    Some(handler)
}

fn unsupported(handler: &'static str, model: &Model) -> GenerationError {
    GenerationError::UnsupportedModel {
        handler,
        kind: model.kind().as_str(),
        id: model.id().to_string(),
    }
}

/// Generates `<Name>[Test]MetaModel` classes for domain types.
#[derive(Debug, Clone)]
pub struct DomainTypeHandler {
    parser_id: &'static str,
    handler_type: HandlerType,
    template: &'static str,
    super_class: &'static str,
}

impl DomainTypeHandler {
    pub fn source() -> Self {
        Self {
            parser_id: parser_ids::DOMAIN_TYPE,
            handler_type: HandlerType::SourceDomain,
            template: DOMAIN_TYPE_TEMPLATE,
            super_class: "AbstractDomainTypeMetaModel",
        }
    }

    pub fn external() -> Self {
        Self {
            parser_id: parser_ids::EXTERNAL_DOMAIN_TYPE,
            ..Self::source()
        }
    }

    pub fn test() -> Self {
        Self {
            parser_id: parser_ids::TEST_DOMAIN_TYPE,
            handler_type: HandlerType::TestDomain,
            template: TEST_DOMAIN_TYPE_TEMPLATE,
            super_class: "AbstractDomainTypeTestMetaModel",
        }
    }

    pub fn test_external() -> Self {
        Self {
            parser_id: parser_ids::TEST_EXTERNAL_DOMAIN_TYPE,
            ..Self::test()
        }
    }

    fn context(&self, naming: &NamingStrategy, model: &DomainTypeModel) -> Map<String, Value> {
        let mut imports = BTreeSet::new();
        let properties: Vec<Value> = model
            .properties
            .values()
            .map(|property| {
                let type_class = property
                    .property_type
                    .as_ref()
                    .map(|property_type| property_type.type_class.as_str())
                    .unwrap_or(UNTYPED_PROPERTY_CLASS);
                if let Some(import) = java_import(type_class) {
                    imports.insert(import);
                }
                json!({
                    "id": property.id,
                    "name": property.name,
                    "constantName": naming.constant_name_for_property(property),
                    "typeClass": type_class,
                })
            })
            .collect();

        let mut context = Map::new();
        context.insert("className".into(), json!(naming.class_name_for_domain_type(model)));
        context.insert("superClassName".into(), json!(self.super_class));
        context.insert("typeId".into(), json!(model.header.id));
        context.insert("typeName".into(), json!(model.header.display_name()));
        context.insert(
            "constantName".into(),
            json!(naming.constant_name_for_domain_type(model)),
        );
        context.insert("external".into(), json!(model.external));
        context.insert("imports".into(), json!(imports));
        context.insert("properties".into(), Value::Array(properties));
        context
    }
}

fn java_import(type_class: &str) -> Option<&'static str> {
    match type_class {
        "BigDecimal" => Some("java.math.BigDecimal"),
        "Date" => Some("java.util.Date"),
        "Locale" => Some("java.util.Locale"),
        _ => None,
    }
}

impl ModelHandler for DomainTypeHandler {
    fn parser_id(&self) -> &'static str {
        self.parser_id
    }

    fn handler_type(&self) -> HandlerType {
        self.handler_type
    }

    fn handle(
        &self,
        _context: &HandlerContext,
        model: &Model,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError> {
        let domain_type = model
            .as_domain_type()
            .ok_or_else(|| unsupported(self.parser_id, model))?;
        let naming = NamingStrategy::new(self.handler_type);

        let file_name = format!(
            "{}{}",
            naming.class_name_for_domain_type(domain_type),
            JAVA_FILE_EXTENSION
        );
        generator.generate(
            self.template,
            &file_name,
            DOMAIN_SUB_PACKAGE,
            self.context(&naming, domain_type),
            &[model],
        )?;
        Ok(1)
    }
}

/// Class name of a view as generated by [`ViewHandler`].
fn view_class_name(naming: &NamingStrategy, context: &HandlerContext, view: &ViewModel) -> String {
    match context.process_for_view(&view.header.id) {
        Some(process) => naming.class_name_for_view_with_process(view, process),
        None => naming.class_name_for_view(view),
    }
}

fn find_view<'a>(context: &'a HandlerContext, view_id: &str) -> Option<&'a ViewModel> {
    context
        .models(parser_ids::VIEW)
        .iter()
        .filter_map(Model::as_view)
        .find(|view| view.header.id == view_id)
}

/// Generates `<Name>ProcessMetaModel` classes into the test tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessHandler;

impl ProcessHandler {
    fn context(
        &self,
        naming: &NamingStrategy,
        context: &HandlerContext,
        process: &ProcessModel,
    ) -> Map<String, Value> {
        let start_states: Vec<Value> = process
            .start_states
            .iter()
            .map(|state| {
                json!({
                    "id": state.header.id,
                    "constantName": naming.constant_name_for_start_state(state),
                })
            })
            .collect();

        let view_states: Vec<Value> = process
            .view_states
            .iter()
            .map(|state| {
                let view_class = state
                    .view_reference
                    .as_deref()
                    .and_then(|reference| find_view(context, reference))
                    .map(|view| view_class_name(naming, context, view));
                json!({
                    "id": state.header.id,
                    "constantName": naming.constant_name_for_view_state(state),
                    "viewName": naming.class_name_for_view_state(state),
                    "viewClass": view_class,
                })
            })
            .collect();

        let mut values = Map::new();
        values.insert("className".into(), json!(naming.class_name_for_process(process)));
        values.insert("processId".into(), json!(process.header.id));
        values.insert("constantName".into(), json!(naming.constant_name_for_process(process)));
        values.insert("startStates".into(), Value::Array(start_states));
        values.insert("viewStates".into(), Value::Array(view_states));
        values
    }
}

impl ModelHandler for ProcessHandler {
    fn parser_id(&self) -> &'static str {
        parser_ids::PROCESS
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::TestDomain
    }

    fn handle(
        &self,
        context: &HandlerContext,
        model: &Model,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError> {
        let process = model
            .as_process()
            .ok_or_else(|| unsupported(parser_ids::PROCESS, model))?;
        let naming = NamingStrategy::new(self.handler_type());

        let file_name = format!("{}{}", naming.class_name_for_process(process), JAVA_FILE_EXTENSION);
        generator.generate(
            PROCESS_TEMPLATE,
            &file_name,
            PROCESS_SUB_PACKAGE,
            self.context(&naming, context, process),
            &[model],
        )?;
        Ok(1)
    }
}

/// Generates page classes for views into the test tree.
///
/// The class name is qualified by the process rendering the view, if any.
#[derive(Debug, Clone)]
pub struct ViewHandler {
    super_class: String,
}

impl ViewHandler {
    pub fn new(super_class: impl Into<String>) -> Self {
        Self {
            super_class: super_class.into(),
        }
    }

    fn context(&self, naming: &NamingStrategy, class_name: &str, view: &ViewModel) -> Map<String, Value> {
        let components: Vec<Value> = view
            .components
            .iter()
            .filter_map(|component| {
                let query = component_query(&component.tag_name)?;
                let has = |method: ConvenienceMethod| query.methods.contains(&method);
                Some(json!({
                    "variable": naming.variable_name_for_component(component),
                    "identifier": component.identifier,
                    "label": component.label,
                    "query": query.query,
                    "getter": has(ConvenienceMethod::Getter),
                    "clickable": has(ConvenienceMethod::Clickable),
                    "visible": has(ConvenienceMethod::Visible),
                }))
            })
            .collect();

        let mut values = Map::new();
        values.insert("className".into(), json!(class_name));
        values.insert("superClassName".into(), json!(self.super_class));
        values.insert("viewId".into(), json!(view.header.id));
        values.insert("components".into(), Value::Array(components));
        values
    }
}

impl ModelHandler for ViewHandler {
    fn parser_id(&self) -> &'static str {
        parser_ids::VIEW
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::TestDomain
    }

    fn handle(
        &self,
        context: &HandlerContext,
        model: &Model,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError> {
        let view = model
            .as_view()
            .ok_or_else(|| unsupported(parser_ids::VIEW, model))?;
        let naming = NamingStrategy::new(self.handler_type());
        let class_name = view_class_name(&naming, context, view);

        let file_name = format!("{class_name}{JAVA_FILE_EXTENSION}");
        generator.generate(
            VIEW_TEMPLATE,
            &file_name,
            VIEW_SUB_PACKAGE,
            self.context(&naming, &class_name, view),
            &[model],
        )?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::HandlebarsRenderer;
    use metagen_core::{
        ModelHeader, PropertyModel, PropertyType, ViewComponentModel, ViewStateModel,
    };
    use metagen_parse::{ParserSettings, RelationParser, ViewParser};

    fn generator(target: &std::path::Path, handler_type: HandlerType) -> SourceGenerator {
        let renderer = HandlebarsRenderer::new().expect("renderer");
        SourceGenerator::new(target, "org.acme.meta", handler_type, Arc::new(renderer))
    }

    fn header(id: &str) -> ModelHeader {
        ModelHeader::new(id, None, "/models/x.xml")
    }

    #[test]
    fn domain_type_source_lists_properties() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut domain_type = DomainTypeModel::new(header("customer_order"), false);
        domain_type.add_property(PropertyModel::typed(
            "customer_order.total",
            "total",
            PropertyType::new("BigDecimal"),
        ));
        domain_type.add_property(PropertyModel {
            id: "customer_order.extra".to_string(),
            name: "extra".to_string(),
            property_type: None,
            property_ref: None,
        });
        let model = Model::DomainType(domain_type);

        let written = DomainTypeHandler::source()
            .handle(
                &HandlerContext::new(),
                &model,
                &generator(dir.path(), HandlerType::SourceDomain),
            )
            .expect("handle");
        assert_eq!(written, 1);

        let path = dir
            .path()
            .join("org/acme/meta/domain/CustomerOrderMetaModel.java");
        let source = std::fs::read_to_string(path).expect("read source");
        assert!(source.contains("package org.acme.meta.domain;"));
        assert!(source.contains("import java.math.BigDecimal;"));
        assert!(source.contains("public final class CustomerOrderMetaModel"));
        assert!(source.contains("extends AbstractDomainTypeMetaModel"));
        assert!(source.contains("PropertyMetaModel<BigDecimal> TOTAL ="));
        assert!(source.contains("PropertyMetaModel<Object> EXTRA ="));
    }

    #[test]
    fn test_domain_type_uses_test_class_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut domain_type = DomainTypeModel::new(header("customer"), false);
        domain_type.add_property(PropertyModel::typed(
            "customer.name",
            "name",
            PropertyType::new("String"),
        ));
        let model = Model::DomainType(domain_type);

        DomainTypeHandler::test()
            .handle(
                &HandlerContext::new(),
                &model,
                &generator(dir.path(), HandlerType::TestDomain),
            )
            .expect("handle");

        let source = std::fs::read_to_string(
            dir.path().join("org/acme/meta/domain/CustomerTestMetaModel.java"),
        )
        .expect("read source");
        assert!(source.contains("PropertyMetaModel<String> NAME ="));
        assert!(source.contains("public CustomerTestMetaModel withName(String value)"));
        assert!(source.contains("set(NAME, value);"));
    }

    #[test]
    fn handler_rejects_foreign_models() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = Model::View(ViewModel::new(header("v_x")));

        let result = DomainTypeHandler::source().handle(
            &HandlerContext::new(),
            &model,
            &generator(dir.path(), HandlerType::SourceDomain),
        );
        assert!(matches!(result, Err(GenerationError::UnsupportedModel { .. })));
    }

    #[test]
    fn view_and_process_reference_each_other() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut process = ProcessModel::new(header("p_order"));
        process.view_states.push(ViewStateModel {
            header: header("vs_edit"),
            view_reference: Some("p_order.v_edit".to_string()),
        });
        let mut view = ViewModel::new(header("p_order.v_edit"));
        view.components.push(ViewComponentModel {
            tag_name: "text-field".to_string(),
            identifier: "p_order.v_edit.customerName".to_string(),
            label: None,
        });

        let mut context = HandlerContext::new();
        context.insert(parser_ids::PROCESS, vec![Model::Process(process)]);
        context.insert(parser_ids::VIEW, vec![Model::View(view)]);
        let generator = generator(dir.path(), HandlerType::TestDomain);

        let process_model = context.model(parser_ids::PROCESS, 0).expect("process");
        ProcessHandler
            .handle(&context, process_model, &generator)
            .expect("process");
        let view_model = context.model(parser_ids::VIEW, 0).expect("view");
        ViewHandler::new("PortalView")
            .handle(&context, view_model, &generator)
            .expect("view");

        let process_source = std::fs::read_to_string(
            dir.path().join("org/acme/meta/process/OrderProcessMetaModel.java"),
        )
        .expect("process source");
        assert!(process_source.contains(
            "ViewStateMetaModel EDIT = new ViewStateMetaModel(ID, \"vs_edit\", \"OrderEditView\", OrderOrderEditView.class);"
        ));

        let view_source =
            std::fs::read_to_string(dir.path().join("org/acme/meta/view/OrderOrderEditView.java"))
                .expect("view source");
        assert!(view_source.contains("extends PortalView"));
        assert!(view_source.contains("TEXT_FIELD_CUSTOMER_NAME_ID = \"p_order.v_edit.customerName\""));
        assert!(view_source.contains("public ModelElement getTextFieldCustomerName()"));
        assert!(view_source.contains("public boolean isTextFieldCustomerNameVisible()"));
        assert!(!view_source.contains("clickTextFieldCustomerName"));
    }

    #[test]
    fn capabilities_follow_parser_ids() {
        assert!(handler_for(&RelationParser::default()).is_none());

        let mut view_parser = ViewParser::default();
        let mut settings = ParserSettings::new();
        settings.insert(
            parser_ids::CONFIG_KEY_EXTENDS_CLASS.to_string(),
            "PortalView".to_string(),
        );
        view_parser.configure(&settings);

        let handler = handler_for(&view_parser).expect("view handler");
        assert_eq!(handler.parser_id(), parser_ids::VIEW);
        assert_eq!(handler.handler_type(), HandlerType::TestDomain);
    }
}
