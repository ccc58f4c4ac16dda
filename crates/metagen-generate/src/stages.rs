//! Sequential stages between parsing and generation: merge, resolve, sort.

use std::collections::HashMap;

use metagen_core::{Model, PropertyType};
use metagen_parse::ModelParser;
use tracing::{debug, info, warn};

use crate::errors::PipelineError;

/// Merge models sharing an id but coming from different files.
///
/// For every model that was not merged away, all later models with the same
/// id and a different location are folded into it by the parser and dropped.
/// Returns the surviving models and the number of merges performed.
pub fn merge_models(
    parser: &dyn ModelParser,
    mut models: Vec<Model>,
) -> Result<(Vec<Model>, usize), PipelineError> {
    let mut obsolete = vec![false; models.len()];
    let mut merged = 0;

    for index in 0..models.len() {
        if obsolete[index] {
            continue;
        }

        let (head, tail) = models.split_at_mut(index + 1);
        let primary = &mut head[index];

        for (offset, other) in tail.iter().enumerate() {
            let other_index = index + 1 + offset;
            if obsolete[other_index]
                || other.id() != primary.id()
                || other.location() == primary.location()
            {
                continue;
            }

            let (primary_suffix, other_suffix) =
                differing_suffixes(primary.location(), other.location());
            info!(
                parser = parser.id(),
                model_id = %primary.id(),
                location = %format!("... {primary_suffix}"),
                merged_location = %format!("... {other_suffix}"),
                "model merged with further definition"
            );

            parser.merge(primary, other)?;
            obsolete[other_index] = true;
            merged += 1;
        }
    }

    let survivors = models
        .into_iter()
        .zip(obsolete)
        .filter_map(|(model, obsolete)| (!obsolete).then_some(model))
        .collect();

    Ok((survivors, merged))
}

/// Parts of two locations after their common prefix.
fn differing_suffixes<'a>(left: &'a str, right: &'a str) -> (&'a str, &'a str) {
    let common = left
        .char_indices()
        .zip(right.chars())
        .find(|((_, l), r)| l != r)
        .map(|((index, _), _)| index)
        .unwrap_or_else(|| left.len().min(right.len()));

    (&left[common..], &right[common..])
}

#[derive(Debug, Clone)]
struct PropertyEntry {
    property_type: Option<PropertyType>,
    property_ref: Option<String>,
}

/// Assign concrete types to properties typed through a reference.
///
/// Lookups search the domain types of all groups in group order; the first
/// property with a matching id wins. Returns the number of resolved
/// properties.
pub fn resolve_references(groups: &mut [Vec<Model>]) -> Result<usize, PipelineError> {
    let index = property_index(groups);
    let mut resolved = 0;

    for models in groups.iter_mut() {
        for model in models.iter_mut() {
            let Some(domain_type) = model.as_domain_type_mut() else {
                continue;
            };

            for property in domain_type.properties.values_mut() {
                if !property.needs_resolution() {
                    continue;
                }
                let Some(reference) = property.property_ref.as_deref() else {
                    continue;
                };

                debug!(property = %property.id, reference, "resolving property reference");
                let property_type = resolve_reference(&index, &property.id, reference)?;
                property.property_type = Some(property_type);
                resolved += 1;
            }
        }
    }

    info!(resolved, "property references resolved");
    Ok(resolved)
}

fn property_index(groups: &[Vec<Model>]) -> HashMap<String, PropertyEntry> {
    let mut index = HashMap::new();

    for model in groups.iter().flatten() {
        let Some(domain_type) = model.as_domain_type() else {
            continue;
        };
        for property in domain_type.properties.values() {
            index.entry(property.id.clone()).or_insert_with(|| PropertyEntry {
                property_type: property.property_type.clone(),
                property_ref: property.property_ref.clone(),
            });
        }
    }

    index
}

fn resolve_reference(
    index: &HashMap<String, PropertyEntry>,
    dependent: &str,
    reference: &str,
) -> Result<PropertyType, PipelineError> {
    let mut chain = vec![dependent.to_string()];
    let mut target = reference.to_string();

    loop {
        if chain.contains(&target) {
            chain.push(target);
            return Err(PipelineError::CyclicReference {
                chain: chain.join(" -> "),
            });
        }

        let Some(entry) = index.get(&target) else {
            warn!(
                property = %dependent,
                reference = %target,
                "referenced property not found, using default type"
            );
            return Ok(PropertyType::fallback());
        };

        if let Some(next) = &entry.property_ref {
            chain.push(std::mem::replace(&mut target, next.clone()));
            continue;
        }

        // errors name the property being resolved, not the last hop
        return entry
            .property_type
            .clone()
            .ok_or_else(|| PipelineError::UnresolvableReference {
                dependent: dependent.to_string(),
                target,
            });
    }
}

/// Order a group by model id. The sort is stable.
pub fn sort_models(models: &mut [Model]) {
    models.sort_by(|left, right| left.id().cmp(right.id()));
}
