use std::collections::BTreeMap;

use metagen_core::{DomainTypeModel, Model, ProcessModel, parser_ids};

/// Finalized models of a run keyed by parser id.
///
/// Built once after merge, resolution and sorting. Shared read-only by all
/// generation jobs and post-processors.
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    groups: BTreeMap<String, Vec<Model>>,
}

impl HandlerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parser_id: impl Into<String>, models: Vec<Model>) {
        self.groups.insert(parser_id.into(), models);
    }

    /// Models produced by a parser, empty if the parser is not registered.
    pub fn models(&self, parser_id: &str) -> &[Model] {
        self.groups
            .get(parser_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn model(&self, parser_id: &str, index: usize) -> Option<&Model> {
        self.models(parser_id).get(index)
    }

    /// Domain types of the given parsers, in parser order.
    pub fn domain_types<'a>(
        &'a self,
        ids: &'a [&str],
    ) -> impl Iterator<Item = &'a DomainTypeModel> + 'a {
        ids.iter()
            .flat_map(move |id| self.models(id))
            .filter_map(Model::as_domain_type)
    }

    pub fn processes(&self) -> impl Iterator<Item = &ProcessModel> {
        self.models(parser_ids::PROCESS)
            .iter()
            .filter_map(Model::as_process)
    }

    /// The first process with a view state rendering `view_id`.
    pub fn process_for_view(&self, view_id: &str) -> Option<&ProcessModel> {
        self.processes()
            .find(|process| process.references_view(view_id))
    }

    pub fn model_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagen_core::{ModelHeader, ViewStateModel};

    #[test]
    fn finds_owning_process_of_a_view() {
        let mut process = ProcessModel::new(ModelHeader::new("p_order", None, "/p.xml"));
        process.view_states.push(ViewStateModel {
            header: ModelHeader::new("vs_edit", None, "/p.xml"),
            view_reference: Some("p_order.v_edit".to_string()),
        });

        let mut context = HandlerContext::new();
        context.insert(parser_ids::PROCESS, vec![Model::Process(process)]);

        assert_eq!(
            context.process_for_view("p_order.v_edit").map(|p| p.header.id.as_str()),
            Some("p_order")
        );
        assert!(context.process_for_view("p_other.v_x").is_none());
        assert!(context.models(parser_ids::VIEW).is_empty());
        assert_eq!(context.model_count(), 1);
    }
}
