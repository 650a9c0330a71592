//! Driver-level tests: the whole read → parse → evaluate → emit pipeline.

use fabrique::cli::{run, RunOptions};
use fabrique_core::Reporter;

fn options(fabfile: std::path::PathBuf, output: std::path::PathBuf) -> RunOptions {
    RunOptions {
        fabfile,
        defines: Vec::new(),
        output_dir: output,
        formats: vec!["ninja".to_string()],
        parse_only: false,
        print_dag: false,
        to_stdout: false,
        color: false,
    }
}

#[test]
fn a_successful_run_writes_the_build_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fabfile = dir.path().join("build.fab");
    std::fs::write(
        &fabfile,
        "srcs = files(a.c);\n\
         cc = action('cc -c $in -o $out' <- in: file[in], out: file[out]);\n\
         objs = foreach s <= srcs in cc(in = s, out = s + '.o');\n",
    )
    .expect("write fabfile");

    let output = dir.path().join("out");
    let mut reporter = Reporter::new();
    run(&options(fabfile, output.clone()), &mut reporter).expect("run");

    let ninja = std::fs::read_to_string(output.join("build.ninja")).expect("build.ninja");
    assert!(ninja.contains("rule cc"));
    assert!(!reporter.has_errors());
}

#[test]
fn a_failing_run_writes_no_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fabfile = dir.path().join("build.fab");
    std::fs::write(&fabfile, "x = missing_name;\n").expect("write fabfile");

    let output = dir.path().join("out");
    let mut reporter = Reporter::new();
    let err = run(&options(fabfile, output.clone()), &mut reporter).expect_err("should fail");

    assert_eq!(err.exit_code(), 2);
    assert!(reporter.has_errors());
    assert!(!output.exists(), "no output directory should be created");
}

#[test]
fn defines_become_the_args_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fabfile = dir.path().join("build.fab");
    std::fs::write(&fabfile, "suffix = args.suffix;\n").expect("write fabfile");

    let mut opts = options(fabfile, dir.path().join("out"));
    opts.defines = vec![("suffix".to_string(), ".obj".to_string())];
    opts.formats = vec!["null".to_string()];

    let mut reporter = Reporter::new();
    run(&opts, &mut reporter).expect("run");
}

#[test]
fn unknown_backends_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fabfile = dir.path().join("build.fab");
    std::fs::write(&fabfile, "x = 1;\n").expect("write fabfile");

    let mut opts = options(fabfile, dir.path().join("out"));
    opts.formats = vec!["scons".to_string()];

    let mut reporter = Reporter::new();
    let err = run(&opts, &mut reporter).expect_err("should fail");
    assert!(err.to_string().contains("unknown backend 'scons'"));
}
