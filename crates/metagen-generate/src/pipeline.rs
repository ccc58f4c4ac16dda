//! End-to-end generation run.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use metagen_core::{HandlerType, Model};
use metagen_parse::{ModelCandidate, ModelParser, ParserRegistry, find_candidates, parse_model};
use tracing::{debug, info};

use crate::cleanup::clean_target;
use crate::context::HandlerContext;
use crate::errors::PipelineError;
use crate::executor::BatchExecutor;
use crate::handlers::{ModelHandler, handler_for};
use crate::options::{GenerationSummary, GeneratorOptions};
use crate::postprocess::standard_post_processors;
use crate::source::SourceGenerator;
use crate::stages::{merge_models, resolve_references, sort_models};
use crate::template::{HandlebarsRenderer, TemplateRenderer};

/// A registered parser, its optional generation capability and the models
/// its parse jobs produced.
struct ParserGroup {
    parser: Arc<dyn ModelParser>,
    handler: Option<Arc<dyn ModelHandler>>,
    models: Arc<Mutex<Vec<Model>>>,
}

impl ParserGroup {
    fn new(parser: &Arc<dyn ModelParser>) -> Self {
        Self {
            parser: Arc::clone(parser),
            handler: handler_for(parser.as_ref()),
            models: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take_models(&self) -> Result<Vec<Model>, PipelineError> {
        let mut models = self.models.lock().map_err(|_| poisoned(self.parser.id()))?;
        Ok(std::mem::take(&mut *models))
    }
}

fn poisoned(parser_id: &str) -> PipelineError {
    PipelineError::Worker(format!("model sink of parser '{parser_id}' poisoned"))
}

/// Source generators for the main and the integration-test tree.
struct Generators {
    source: Arc<SourceGenerator>,
    test: Arc<SourceGenerator>,
}

impl Generators {
    fn for_type(&self, handler_type: HandlerType) -> Arc<SourceGenerator> {
        match handler_type {
            HandlerType::SourceDomain => Arc::clone(&self.source),
            HandlerType::TestDomain => Arc::clone(&self.test),
        }
    }
}

/// Entry point for generating Java meta-model sources from model files.
pub struct Pipeline {
    options: GeneratorOptions,
    renderer: Option<Arc<dyn TemplateRenderer>>,
}

impl Pipeline {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            renderer: None,
        }
    }

    /// Use a custom renderer instead of the embedded Handlebars templates.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Discover model files and match them to parsers without parsing.
    pub fn candidates(&self) -> Result<Vec<ModelCandidate>, PipelineError> {
        let registry = ParserRegistry::standard(&self.options.registry_options());
        self.match_candidates(&registry)
    }

    fn match_candidates(
        &self,
        registry: &ParserRegistry,
    ) -> Result<Vec<ModelCandidate>, PipelineError> {
        let files = find_candidates(&self.options.file_set(), &self.options.model_extension)?;
        Ok(registry.match_candidates(&files)?)
    }

    pub async fn run(&self) -> Result<GenerationSummary, PipelineError> {
        let start = Instant::now();
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let options = &self.options;

        info!(
            run_id = %run_id,
            base = %options.base_directory.display(),
            package = %options.package_name,
            workers = options.workers,
            "generation started"
        );
        if options.integration_test_support {
            info!(run_id = %run_id, "integration test support active");
        }

        let mut cleaned = clean_target(&options.target_directory, &options.package_name)?;
        cleaned += clean_target(&options.test_target_directory, &options.package_name)?;

        let registry = ParserRegistry::standard(&options.registry_options());
        let candidates = self.match_candidates(&registry)?;
        info!(
            run_id = %run_id,
            candidates = candidates.len(),
            "model candidates found, not all may be handled"
        );

        let executor = BatchExecutor::new(options.workers);
        let groups: Vec<ParserGroup> = registry.parsers().iter().map(ParserGroup::new).collect();

        info!(run_id = %run_id, "phase 1: parsing model candidates");
        let parse_jobs: Vec<_> = candidates
            .iter()
            .map(|candidate| {
                let group = &groups[candidate.parser_index];
                let parser = Arc::clone(&group.parser);
                let sink = Arc::clone(&group.models);
                let path = candidate.path.clone();
                move || -> Result<usize, PipelineError> {
                    let models = parse_model(parser.as_ref(), &path)?;
                    let count = models.len();
                    sink.lock().map_err(|_| poisoned(parser.id()))?.extend(models);
                    Ok(count)
                }
            })
            .collect();
        executor.run_batch("parse", parse_jobs).await?;

        info!(run_id = %run_id, "phase 2: merging models");
        let mut parsed = Vec::with_capacity(groups.len());
        let mut merged = 0;
        for group in &groups {
            let mut models = group.take_models()?;
            // jobs finish in any order; restore file order so merges are reproducible
            models.sort_by(|left, right| left.location().cmp(right.location()));
            let (survivors, count) = merge_models(group.parser.as_ref(), models)?;
            merged += count;
            parsed.push(survivors);
        }

        info!(run_id = %run_id, "phase 3: resolving property references");
        let resolved_references = resolve_references(&mut parsed)?;

        info!(run_id = %run_id, "phase 4: building handler context");
        let mut context = HandlerContext::new();
        for (group, mut models) in groups.iter().zip(parsed) {
            sort_models(&mut models);
            debug!(parser = group.parser.id(), models = models.len(), "group finalized");
            context.insert(group.parser.id(), models);
        }
        let context = Arc::new(context);
        let models = context.model_count();

        info!(run_id = %run_id, models, "phase 5: writing Java sources");
        let renderer = match &self.renderer {
            Some(renderer) => Arc::clone(renderer),
            None => Arc::new(HandlebarsRenderer::new()?) as Arc<dyn TemplateRenderer>,
        };
        let generators = Generators {
            source: Arc::new(SourceGenerator::new(
                &options.target_directory,
                &options.package_name,
                HandlerType::SourceDomain,
                Arc::clone(&renderer),
            )),
            test: Arc::new(SourceGenerator::new(
                &options.test_target_directory,
                &options.package_name,
                HandlerType::TestDomain,
                Arc::clone(&renderer),
            )),
        };

        let mut generate_jobs = Vec::new();
        for group in &groups {
            let Some(handler) = &group.handler else {
                continue;
            };
            let parser_id = group.parser.id();
            for index in 0..context.models(parser_id).len() {
                let context = Arc::clone(&context);
                let handler = Arc::clone(handler);
                let generator = generators.for_type(handler.handler_type());
                generate_jobs.push(move || -> Result<usize, PipelineError> {
                    let model = context.model(parser_id, index).ok_or_else(|| {
                        PipelineError::Worker(format!("model {index} of '{parser_id}' vanished"))
                    })?;
                    Ok(handler.handle(&context, model, &generator)?)
                });
            }
        }
        let generated: usize = executor
            .run_batch("generate", generate_jobs)
            .await?
            .into_iter()
            .sum();

        info!(run_id = %run_id, "phase 6: post-processing (creating domain classes)");
        let mut post_processed = 0;
        for processor in
            standard_post_processors(&options.domain_prefix, options.integration_test_support)
        {
            let generator = generators.for_type(processor.handler_type());
            let written = processor.process(&context, &generator)?;
            debug!(post_processor = processor.name(), written, "post-processor finished");
            post_processed += written;
        }

        let summary = GenerationSummary {
            run_id,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            cleaned,
            candidates: candidates.len(),
            models,
            merged,
            resolved_references,
            generated,
            post_processed,
            total: generated + post_processed,
        };

        info!(
            run_id = %summary.run_id,
            total = summary.total,
            duration_ms = summary.duration_ms,
            "generation completed"
        );
        Ok(summary)
    }
}
