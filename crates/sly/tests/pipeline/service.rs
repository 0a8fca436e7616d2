//! The compiler service end to end.

use std::sync::Arc;

use sly::{
    Command, CommandRecorder, CompilerError, CompilerOptions, ExpressionNode as E, Extension,
    Filter, Frontend, FrontendFactory, Plugin, PushStream, SlyCompiler, StreamWarning,
};

/// A frontend that replays a fixed command script, prefixed with one
/// marker per registered plugin so rebuilds are observable.
struct ScriptedFrontend {
    script: fn(&mut PushStream<'_>),
    plugin_names: Vec<String>,
}

impl Frontend for ScriptedFrontend {
    fn drive(&self, _source: &str, stream: &mut PushStream<'_>) {
        for name in &self.plugin_names {
            stream.write(Command::out_text(format!("<{name}>")));
        }
        (self.script)(stream);
    }
}

struct ScriptedFactory {
    script: fn(&mut PushStream<'_>),
}

impl FrontendFactory for ScriptedFactory {
    fn build(
        &self,
        plugins: &[Arc<dyn Plugin>],
        _filters: &[Arc<dyn Filter>],
    ) -> Arc<dyn Frontend> {
        Arc::new(ScriptedFrontend {
            script: self.script,
            plugin_names: plugins.iter().map(|p| p.name().to_string()).collect(),
        })
    }
}

fn compiler_with(script: fn(&mut PushStream<'_>)) -> SlyCompiler {
    SlyCompiler::new(ScriptedFactory { script })
}

#[test]
fn compile_runs_the_full_pipeline() {
    let compiler = compiler_with(|stream| {
        stream.write(Command::binding_start("cond", E::BooleanConstant(false)));
        stream.write(Command::conditional_start("cond", true));
        stream.write(Command::out_text("never"));
        stream.write(Command::conditional_end());
        stream.write(Command::binding_end());
        stream.write(Command::out_text("rendered"));
        stream.close();
    });
    let mut backend = CommandRecorder::new();
    compiler.compile("template", &mut backend).unwrap();
    assert_eq!(backend.commands(), &[Command::out_text("rendered")]);
    assert!(backend.is_done());
}

#[test]
fn empty_source_is_refused_before_the_frontend_runs() {
    let compiler = compiler_with(|_| panic!("frontend must not run"));
    let mut backend = CommandRecorder::new();
    assert!(matches!(
        compiler.compile("", &mut backend),
        Err(CompilerError::EmptySource)
    ));
}

#[test]
fn structure_validation_rejects_crossing_brackets() {
    let compiler = compiler_with(|stream| {
        stream.write(Command::binding_start("x", E::string("v")));
        stream.write(Command::loop_start("items", "item", "itemList"));
        stream.write(Command::binding_end());
        stream.write(Command::loop_end());
        stream.close();
    });
    let mut backend = CommandRecorder::new();
    compiler.compile("template", &mut backend).unwrap();
    assert_eq!(backend.errors().len(), 1);
    assert!(backend.errors()[0].message.contains("mismatched"));
    assert!(!backend.is_done());
}

#[test]
fn structure_validation_can_be_disabled() {
    // Without the structure pass, the same fault is still caught by
    // the optimizer itself, just with a different report.
    let compiler = SlyCompiler::with_options(
        ScriptedFactory {
            script: |stream| {
                stream.write(Command::loop_end());
                stream.close();
            },
        },
        CompilerOptions {
            validate_structure: false,
        },
    );
    let mut backend = CommandRecorder::new();
    compiler.compile("template", &mut backend).unwrap();
    assert_eq!(backend.errors().len(), 1);
    assert!(backend.errors()[0].message.contains("without matching start"));
}

#[test]
fn forgotten_close_is_completed_by_the_service() {
    let compiler = compiler_with(|stream| {
        stream.write(Command::out_text("only"));
        // No close: the service terminates the stream itself.
    });
    let mut backend = CommandRecorder::new();
    compiler.compile("template", &mut backend).unwrap();
    assert_eq!(backend.commands(), &[Command::out_text("only")]);
    assert!(backend.is_done());
}

#[test]
fn warnings_are_collected_into_the_report() {
    let compiler = compiler_with(|stream| {
        stream.warn(StreamWarning::new("event handler attribute", "onclick"));
        stream.write(Command::out_text("body"));
        stream.close();
    });
    let mut backend = CommandRecorder::new();
    let report = compiler.compile("template", &mut backend).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].message, "event handler attribute");
    assert_eq!(report.warnings[0].fragment, "onclick");
}

#[test]
fn plugin_registration_takes_effect_on_the_next_compile() {
    struct Marker;
    impl Extension for Marker {
        fn name(&self) -> &str {
            "marker"
        }
        fn priority(&self) -> i32 {
            100
        }
    }
    impl Plugin for Marker {}

    let compiler = compiler_with(|stream| {
        stream.write(Command::out_text("body"));
        stream.close();
    });

    let mut backend = CommandRecorder::new();
    compiler.compile("template", &mut backend).unwrap();
    assert_eq!(backend.commands(), &[Command::out_text("body")]);

    compiler.register_plugin(Arc::new(Marker));
    let mut backend = CommandRecorder::new();
    compiler.compile("template", &mut backend).unwrap();
    assert_eq!(backend.commands(), &[Command::out_text("<marker>body")]);

    assert!(compiler.unregister_plugin("marker"));
    let mut backend = CommandRecorder::new();
    compiler.compile("template", &mut backend).unwrap();
    assert_eq!(backend.commands(), &[Command::out_text("body")]);
}

#[test]
fn compilers_are_shared_across_threads() {
    let compiler = Arc::new(compiler_with(|stream| {
        stream.write(Command::out_text("concurrent"));
        stream.close();
    }));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let compiler = Arc::clone(&compiler);
            std::thread::spawn(move || {
                let mut backend = CommandRecorder::new();
                compiler.compile("template", &mut backend).unwrap();
                backend.commands().to_vec()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            vec![Command::out_text("concurrent")]
        );
    }
}
