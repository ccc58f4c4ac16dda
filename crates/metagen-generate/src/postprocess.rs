//! Aggregate classes generated after all model handlers finished.

use metagen_core::naming::java_class_name;
use metagen_core::{HandlerType, Model, NamingStrategy, parser_ids};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::context::HandlerContext;
use crate::errors::GenerationError;
use crate::source::{JAVA_FILE_EXTENSION, SourceGenerator};
use crate::template::{DOMAIN_TEMPLATE, PROCESS_DOMAIN_TEMPLATE, TEST_DOMAIN_TEMPLATE};

/// Runs once per pipeline with the complete handler context.
pub trait PostProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn handler_type(&self) -> HandlerType;

    /// Generate the aggregate artifacts, returning how many were written.
    fn process(
        &self,
        context: &HandlerContext,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError>;
}

/// Post-processors for a run.
pub fn standard_post_processors(
    domain_prefix: &str,
    integration_test_support: bool,
) -> Vec<Box<dyn PostProcessor>> {
    let prefix = java_class_name(domain_prefix);
    let mut processors: Vec<Box<dyn PostProcessor>> =
        vec![Box::new(DomainPostProcessor::new(&prefix))];

    if integration_test_support {
        processors.push(Box::new(TestDomainPostProcessor::new(&prefix)));
        processors.push(Box::new(ProcessDomainPostProcessor::new(&prefix)));
    }

    processors
}

fn domain_type_entries(
    context: &HandlerContext,
    naming: &NamingStrategy,
    ids: &[&str],
) -> Vec<Value> {
    context
        .domain_types(ids)
        .map(|domain_type| {
            json!({
                "className": naming.class_name_for_domain_type(domain_type),
                "constantName": naming.constant_name_for_domain_type(domain_type),
            })
        })
        .collect()
}

fn base_context(class_name: &str, domain_name: &str) -> Map<String, Value> {
    let mut values = Map::new();
    values.insert("className".into(), json!(class_name));
    values.insert("domainName".into(), json!(domain_name));
    values
}

/// `<Prefix>Domain`: all domain types, external domain types and relations.
#[derive(Debug, Clone)]
pub struct DomainPostProcessor {
    prefix: String,
}

impl DomainPostProcessor {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl PostProcessor for DomainPostProcessor {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::SourceDomain
    }

    fn process(
        &self,
        context: &HandlerContext,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError> {
        let naming = NamingStrategy::new(self.handler_type());
        let class_name = format!("{}Domain", self.prefix);

        let domain_type_ids = [parser_ids::DOMAIN_TYPE, parser_ids::EXTERNAL_DOMAIN_TYPE];
        let relations: Vec<&Model> = context.models(parser_ids::RELATION).iter().collect();
        let relation_entries: Vec<Value> = relations
            .iter()
            .map(|relation| {
                json!({
                    "id": relation.id(),
                    "constantName": naming.constant_name_for_model(relation.header()),
                })
            })
            .collect();

        let mut values = base_context(&class_name, &self.prefix);
        values.insert(
            "domainTypes".into(),
            Value::Array(domain_type_entries(context, &naming, &domain_type_ids)),
        );
        values.insert("relations".into(), Value::Array(relation_entries));

        generator.generate(
            DOMAIN_TEMPLATE,
            &format!("{class_name}{JAVA_FILE_EXTENSION}"),
            "",
            values,
            &relations,
        )?;
        debug!(class_name = %class_name, "domain aggregate written");
        Ok(1)
    }
}

/// `<Prefix>TestDomain`: test domain types and test external domain types.
#[derive(Debug, Clone)]
pub struct TestDomainPostProcessor {
    prefix: String,
}

impl TestDomainPostProcessor {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl PostProcessor for TestDomainPostProcessor {
    fn name(&self) -> &'static str {
        "test-domain"
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::TestDomain
    }

    fn process(
        &self,
        context: &HandlerContext,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError> {
        let naming = NamingStrategy::new(self.handler_type());
        let class_name = format!("{}TestDomain", self.prefix);
        let ids = [
            parser_ids::TEST_DOMAIN_TYPE,
            parser_ids::TEST_EXTERNAL_DOMAIN_TYPE,
        ];

        let mut values = base_context(&class_name, &self.prefix);
        values.insert(
            "domainTypes".into(),
            Value::Array(domain_type_entries(context, &naming, &ids)),
        );

        generator.generate(
            TEST_DOMAIN_TEMPLATE,
            &format!("{class_name}{JAVA_FILE_EXTENSION}"),
            "",
            values,
            &[],
        )?;
        Ok(1)
    }
}

/// `<Prefix>ProcessDomain`: every process meta model.
#[derive(Debug, Clone)]
pub struct ProcessDomainPostProcessor {
    prefix: String,
}

impl ProcessDomainPostProcessor {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl PostProcessor for ProcessDomainPostProcessor {
    fn name(&self) -> &'static str {
        "process-domain"
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::TestDomain
    }

    fn process(
        &self,
        context: &HandlerContext,
        generator: &SourceGenerator,
    ) -> Result<usize, GenerationError> {
        let naming = NamingStrategy::new(self.handler_type());
        let class_name = format!("{}ProcessDomain", self.prefix);

        let processes: Vec<Value> = context
            .processes()
            .map(|process| {
                json!({
                    "className": naming.class_name_for_process(process),
                    "constantName": naming.constant_name_for_process(process),
                })
            })
            .collect();

        let mut values = base_context(&class_name, &self.prefix);
        values.insert("processes".into(), Value::Array(processes));

        generator.generate(
            PROCESS_DOMAIN_TEMPLATE,
            &format!("{class_name}{JAVA_FILE_EXTENSION}"),
            "",
            values,
            &[],
        )?;
        Ok(1)
    }
}
