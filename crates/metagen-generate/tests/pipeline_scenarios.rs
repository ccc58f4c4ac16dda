use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use metagen_generate::{GeneratorOptions, Pipeline, PipelineError};
use metagen_parse::ParseError;

fn write_model(base: &Path, relative: &str, xml: &str) {
    let path = base.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, xml).expect("write model");
}

fn options(root: &Path) -> GeneratorOptions {
    GeneratorOptions {
        base_directory: root.join("app"),
        package_name: "org.acme.meta".to_string(),
        domain_prefix: "crm".to_string(),
        target_directory: root.join("out/main"),
        test_target_directory: root.join("out/test"),
        workers: 2,
        ..GeneratorOptions::default()
    }
}

fn domain_source(root: &Path, class_name: &str) -> PathBuf {
    root.join("out/main/org/acme/meta/domain")
        .join(format!("{class_name}.java"))
}

fn read_tree(dir: &Path) -> BTreeMap<PathBuf, String> {
    let mut files = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).expect("read dir") {
            let path = entry.expect("entry").path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let content = fs::read_to_string(&path).expect("read file");
                files.insert(path, content);
            }
        }
    }
    files
}

#[tokio::test]
async fn reference_takes_the_type_of_its_target() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    write_model(
        &app,
        "models/domain/types/a.xml",
        r#"<domain-type id="A"><property id="p" type="Integer"/></domain-type>"#,
    );
    write_model(
        &app,
        "models/domain/types/b.xml",
        r#"<domain-type id="B"><property id="q" ref="A.p"/></domain-type>"#,
    );

    let summary = Pipeline::new(options(root.path()))
        .run()
        .await
        .expect("pipeline run");

    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.resolved_references, 1);
    assert_eq!(summary.generated, 2);
    assert_eq!(summary.post_processed, 1);
    assert_eq!(summary.total, 3);

    let source = fs::read_to_string(domain_source(root.path(), "BMetaModel")).expect("B source");
    assert!(source.contains("PropertyMetaModel<Integer> Q ="));

    let domain = fs::read_to_string(root.path().join("out/main/org/acme/meta/CrmDomain.java"))
        .expect("domain aggregate");
    assert!(domain.contains("public static final AMetaModel A = new AMetaModel();"));
    assert!(domain.contains("public static final BMetaModel B = new BMetaModel();"));
}

#[tokio::test]
async fn definitions_from_two_files_are_merged_once() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    write_model(
        &app,
        "models/domain/types/x.xml",
        r#"<domain-type id="X"><property id="a" type="Integer"/></domain-type>"#,
    );
    write_model(
        &app,
        "models/domain/joined/x.xml",
        r#"<domain-type id="X"><property id="b" type="Long"/></domain-type>"#,
    );

    let summary = Pipeline::new(options(root.path()))
        .run()
        .await
        .expect("pipeline run");

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.models, 1);
    assert_eq!(summary.generated, 1);

    let source = fs::read_to_string(domain_source(root.path(), "XMetaModel")).expect("X source");
    assert!(source.contains("PropertyMetaModel<Integer> A ="));
    assert!(source.contains("PropertyMetaModel<Long> B ="));
}

#[tokio::test]
async fn excluded_models_are_not_generated() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    write_model(&app, "models/domain/types/x.xml", r#"<domain-type id="X"/>"#);
    write_model(&app, "models/domain/types/y.xml", r#"<domain-type id="Y"/>"#);

    let mut options = options(root.path());
    options.excluded_models = vec!["Y".to_string()];

    let summary = Pipeline::new(options).run().await.expect("pipeline run");

    assert_eq!(summary.generated, 1);
    assert!(domain_source(root.path(), "XMetaModel").exists());
    assert!(!domain_source(root.path(), "YMetaModel").exists());
}

#[tokio::test]
async fn duplicate_relations_abort_the_run() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    write_model(
        &app,
        "models/domain/a/relations.xml",
        r#"<relation-set><relation id="owns"/></relation-set>"#,
    );
    write_model(
        &app,
        "models/domain/b/relations.xml",
        r#"<relation-set><relation id="owns"/></relation-set>"#,
    );

    let result = Pipeline::new(options(root.path())).run().await;

    assert!(matches!(
        result,
        Err(PipelineError::Parse(ParseError::MergeNotSupported { id, .. })) if id == "owns"
    ));
}

#[tokio::test]
async fn cyclic_references_abort_the_run() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    write_model(
        &app,
        "models/domain/types/a.xml",
        r#"<domain-type id="A"><property id="p" ref="B.q"/></domain-type>"#,
    );
    write_model(
        &app,
        "models/domain/types/b.xml",
        r#"<domain-type id="B"><property id="q" ref="A.p"/></domain-type>"#,
    );

    let result = Pipeline::new(options(root.path())).run().await;
    assert!(matches!(result, Err(PipelineError::CyclicReference { .. })));
}

#[tokio::test]
async fn malformed_model_names_the_file() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    write_model(
        &app,
        "models/domain/types/broken.xml",
        r#"<domain-type id="A"><property id="p">"#,
    );

    let result = Pipeline::new(options(root.path())).run().await;
    match result {
        Err(PipelineError::Parse(ParseError::MalformedModel { path, .. })) => {
            assert!(path.ends_with("models/domain/types/broken.xml"));
        }
        other => panic!("expected malformed model error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_support_generates_processes_views_and_aggregates() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    write_model(
        &app,
        "models/domain/types/customer.xml",
        r#"<domain-type id="customer"><property id="name" type="PlainText"/></domain-type>"#,
    );
    write_model(
        &app,
        "models/processes/order.xml",
        r#"<process id="p_order">
             <start-state id="ss_begin"/>
             <view-state id="vs_edit" view="p_order.v_edit"/>
           </process>"#,
    );
    write_model(
        &app,
        "models/processes/views/edit.xml",
        r#"<view id="p_order.v_edit"><link name="save"/></view>"#,
    );

    let mut options = options(root.path());
    options.integration_test_support = true;

    let summary = Pipeline::new(options).run().await.expect("pipeline run");

    // source + test domain type, process, view
    assert_eq!(summary.generated, 4);
    assert_eq!(summary.post_processed, 3);

    let test_package = root.path().join("out/test/org/acme/meta");
    assert!(test_package.join("domain/CustomerTestMetaModel.java").exists());
    assert!(test_package.join("process/OrderProcessMetaModel.java").exists());
    assert!(test_package.join("CrmTestDomain.java").exists());
    assert!(test_package.join("CrmProcessDomain.java").exists());

    let view = fs::read_to_string(test_package.join("view/OrderOrderEditView.java"))
        .expect("view source");
    assert!(view.contains("extends AbstractView"));
    assert!(view.contains("public void clickLinkSave()"));
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let root = tempfile::tempdir().expect("tempdir");
    let app = root.path().join("app");
    for (name, id) in [("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")] {
        write_model(
            &app,
            &format!("models/domain/types/{name}.xml"),
            &format!(r#"<domain-type id="{id}"><property id="p" type="Date"/></domain-type>"#),
        );
    }
    write_model(
        &app,
        "models/domain/relations.xml",
        r#"<relation-set><relation id="owns"/><relation id="bills"/></relation-set>"#,
    );

    let pipeline = Pipeline::new(options(root.path()));
    pipeline.run().await.expect("first run");
    let first = read_tree(&root.path().join("out/main"));

    let summary = pipeline.run().await.expect("second run");
    let second = read_tree(&root.path().join("out/main"));

    assert_eq!(summary.cleaned, first.len());
    assert_eq!(first, second);
}
