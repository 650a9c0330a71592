//! The DAG aggregate and its builder.
//!
//! After the evaluator has reduced a file's bindings to values, the builder
//! sorts them into the shape backends consume: named rules, named targets
//! (values that contain files), named variables (everything else), plus the
//! full set of files and build steps reachable from any binding.
//!
//! Builds reference rules and files only, so the graph is acyclic by
//! construction; the builder still verifies that no build transitively
//! consumes its own outputs before anything is emitted.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use fabrique_core::{FabError, SourceRange};
use indexmap::IndexMap;
use serde_json::json;

use super::{Build, File, Rule, Value, ValuePtr};

/// The evaluation result handed to backends.
#[derive(Debug, Default)]
pub struct Dag {
    /// Named values that are not targets.
    pub variables: IndexMap<String, ValuePtr>,
    /// Named values containing files: what a user asks to have built.
    pub targets: IndexMap<String, ValuePtr>,
    /// Named rules, in binding order.
    pub rules: IndexMap<String, Rc<Rule>>,
    /// Every file referenced anywhere, in discovery order.
    pub files: Vec<Rc<File>>,
    /// Every build step, in discovery order.
    pub builds: Vec<Rc<Build>>,
}

impl Dag {
    /// Sort named bindings into the DAG and enumerate everything reachable.
    pub fn from_bindings(bindings: IndexMap<String, ValuePtr>) -> Result<Self, FabError> {
        let mut dag = Dag::default();
        let mut collector = Collector::default();

        for (name, value) in bindings {
            match value.as_ref() {
                Value::Rule(rule) => {
                    rule.set_name(&name);
                    dag.rules.insert(name.clone(), rule.clone());
                }
                _ if value.typ().has_files() => {
                    dag.targets.insert(name.clone(), value.clone());
                }
                Value::Builtin { .. } => continue,
                _ => {
                    dag.variables.insert(name.clone(), value.clone());
                }
            }
            collector.collect(&value);
        }

        // Anonymous rules reached only through builds still need names.
        let mut anonymous = 0usize;
        for rule in collector.rules {
            if rule.name().is_none() {
                anonymous += 1;
                rule.set_name(&format!("rule_{anonymous}"));
            }
            let name = rule.name().expect("rule was just named").to_string();
            dag.rules.entry(name).or_insert(rule);
        }

        dag.files = collector.files;
        dag.builds = collector.builds;
        dag.verify_acyclic()?;
        Ok(dag)
    }

    /// Verify no build transitively consumes its own outputs.
    fn verify_acyclic(&self) -> Result<(), FabError> {
        // Map each file to the build that produces it.
        let mut producer: HashMap<*const File, usize> = HashMap::new();
        for (index, build) in self.builds.iter().enumerate() {
            for output in build.outputs() {
                producer.insert(Rc::as_ptr(output), index);
            }
        }

        // Depth-first over build -> producer-of-input edges.
        const UNSEEN: u8 = 0;
        const OPEN: u8 = 1;
        const DONE: u8 = 2;
        let mut state = vec![UNSEEN; self.builds.len()];

        fn visit(
            index: usize,
            builds: &[Rc<Build>],
            producer: &HashMap<*const File, usize>,
            state: &mut [u8],
        ) -> Result<(), SourceRange> {
            match state[index] {
                DONE => return Ok(()),
                OPEN => return Err(builds[index].source().clone()),
                _ => {}
            }
            state[index] = OPEN;
            for input in builds[index].inputs() {
                if let Some(&dep) = producer.get(&Rc::as_ptr(input)) {
                    visit(dep, builds, producer, state)?;
                }
            }
            state[index] = DONE;
            Ok(())
        }

        for index in 0..self.builds.len() {
            if let Err(src) = visit(index, &self.builds, &producer, &mut state) {
                return Err(FabError::assertion("cycle in build graph", src));
            }
        }
        Ok(())
    }

    /// Machine-readable dump, also used to check evaluation determinism.
    pub fn to_json(&self) -> serde_json::Value {
        let file_index: HashMap<*const File, usize> = self
            .files
            .iter()
            .enumerate()
            .map(|(i, f)| (Rc::as_ptr(f), i))
            .collect();

        let named = |values: &IndexMap<String, ValuePtr>| -> serde_json::Value {
            let mut out = serde_json::Map::new();
            for (name, value) in values {
                out.insert(
                    name.clone(),
                    json!({
                        "type": value.typ().str(),
                        "value": value.to_string(),
                    }),
                );
            }
            serde_json::Value::Object(out)
        };

        let rules: serde_json::Value = {
            let mut out = serde_json::Map::new();
            for (name, rule) in &self.rules {
                out.insert(
                    name.clone(),
                    json!({
                        "command": rule.command(),
                        "description": rule.description(),
                        "arguments": rule
                            .arguments()
                            .iter()
                            .map(|(k, v)| (k.clone(), json!(v.to_string())))
                            .collect::<serde_json::Map<_, _>>(),
                    }),
                );
            }
            serde_json::Value::Object(out)
        };

        let files: Vec<serde_json::Value> = self
            .files
            .iter()
            .map(|f| {
                json!({
                    "name": f.filename(),
                    "generated": f.generated(),
                })
            })
            .collect();

        let builds: Vec<serde_json::Value> = self
            .builds
            .iter()
            .map(|b| {
                let indices = |files: &[Rc<File>]| -> Vec<usize> {
                    files
                        .iter()
                        .filter_map(|f| file_index.get(&Rc::as_ptr(f)).copied())
                        .collect()
                };
                json!({
                    "rule": b.rule().name(),
                    "inputs": indices(b.inputs()),
                    "outputs": indices(b.outputs()),
                    "arguments": b
                        .arguments()
                        .iter()
                        .map(|(k, v)| (k.clone(), json!(v.to_string())))
                        .collect::<serde_json::Map<_, _>>(),
                })
            })
            .collect();

        json!({
            "variables": named(&self.variables),
            "targets": named(&self.targets),
            "rules": rules,
            "files": files,
            "builds": builds,
        })
    }
}

/// Reachability walk that deduplicates by handle identity.
#[derive(Default)]
struct Collector {
    files: Vec<Rc<File>>,
    builds: Vec<Rc<Build>>,
    rules: Vec<Rc<Rule>>,
    seen_files: HashSet<*const File>,
    seen_builds: HashSet<*const Build>,
    seen_rules: HashSet<*const Rule>,
}

impl Collector {
    fn collect(&mut self, value: &ValuePtr) {
        match value.as_ref() {
            Value::File(file) => self.add_file(file),
            Value::List(list) => {
                for element in list.elements() {
                    self.collect(element);
                }
            }
            Value::Record(record) => {
                for field in record.fields().values() {
                    self.collect(field);
                }
            }
            Value::Rule(rule) => self.add_rule(rule),
            Value::Build(build) => self.add_build(build),
            _ => {}
        }
    }

    fn add_file(&mut self, file: &Rc<File>) {
        if self.seen_files.insert(Rc::as_ptr(file)) {
            self.files.push(file.clone());
        }
    }

    fn add_rule(&mut self, rule: &Rc<Rule>) {
        if self.seen_rules.insert(Rc::as_ptr(rule)) {
            self.rules.push(rule.clone());
            for argument in rule.arguments().values() {
                self.collect(argument);
            }
        }
    }

    fn add_build(&mut self, build: &Rc<Build>) {
        if !self.seen_builds.insert(Rc::as_ptr(build)) {
            return;
        }
        self.builds.push(build.clone());
        self.add_rule(build.rule());
        for file in build.inputs() {
            self.add_file(file);
        }
        for file in build.outputs() {
            self.add_file(file);
        }
        for argument in build.arguments().values() {
            self.collect(argument);
        }
    }
}
