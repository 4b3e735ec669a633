use std::{
    fs,
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};
use tempfile::{tempdir, NamedTempFile};

fn depthqc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depthqc"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute depthqc")
}

fn depthqc_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_depthqc"))
        .args(args)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn depthqc");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().expect("Failed to wait on depthqc")
}

fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_bin_constant_depth() {
    let mut depth = String::new();
    for pos in 0..16384 {
        depth.push_str(&format!("1\t{}\t10\n", pos));
    }
    depth.push_str("2\t0\t99\n");

    let output = depthqc_with_stdin(&["bin", "--chrom", "1"], &depth);

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\t0\t16384\t10.00\n");
}

#[test]
fn test_bin_zero_fills_to_ceiling() {
    let mut depth_file = NamedTempFile::new().unwrap();
    writeln!(depth_file, "1\t16384\t5").unwrap();

    let output = depthqc(&[
        "bin",
        "--chrom",
        "1",
        "--input",
        depth_file.path().to_str().unwrap(),
        "--ceiling",
        "40000",
    ]);

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "1\t0\t16384\t0.00\n1\t16384\t32768\t0.00\n1\t32768\t49152\t0.00\n"
    );
}

#[test]
fn test_bin_malformed_depth_fails() {
    let output = depthqc_with_stdin(&["bin", "--chrom", "1"], "1\t1\t3\n1\tx\t3\n");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid position: 'x'"), "{}", stderr);
}

#[test]
fn test_compare_truncates_to_shorter_file() {
    let dir = tempdir().unwrap();
    let truth = write_file(
        dir.path(),
        "truth.bed",
        "1\t0\t100\t20\n1\t100\t200\t40\n1\t200\t300\t30\n1\t300\n",
    );
    let candidate = write_file(
        dir.path(),
        "candidate.bed",
        "1\t0\t100\t1.0\n1\t100\t200\t2.0\n1\t200\t300\t1.5\n1\t300\t400\t9.0\n",
    );

    let output = depthqc(&["compare", &truth, &candidate, "--json"]);

    assert!(output.status.success(), "{:?}", output);
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["out_of_tolerance"], 0);
    assert_eq!(summary["fraction_within_tight"], 1.0);
}

#[test]
fn test_compare_misaligned_fails() {
    let dir = tempdir().unwrap();
    let truth = write_file(dir.path(), "truth.bed", "1\t0\t100\t20\n1\t100\t200\t40\n");
    let candidate = write_file(dir.path(), "candidate.bed", "1\t0\t100\t1\n1\t150\t250\t2\n");

    let output = depthqc(&["compare", &truth, &candidate]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Positions diverge at row 1"), "{}", stderr);
}

#[cfg(unix)]
#[test]
fn test_validate_against_stub_samtools() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();

    // four covered positions at depth 10, whatever region is asked for
    let samtools = write_file(
        dir.path(),
        "samtools",
        "#!/bin/sh\nprintf '1\\t1\\t10\\n1\\t2\\t10\\n1\\t3\\t10\\n1\\t4\\t10\\n'\n",
    );
    let broken = write_file(
        dir.path(),
        "broken-samtools",
        "#!/bin/sh\necho 'fail to open file' >&2\nexit 3\n",
    );
    for script in [&samtools, &broken] {
        fs::set_permissions(script, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let passing = write_file(dir.path(), "pass.bed", "1\t0\t4\t10\n1\t4\t8\t10.4\n");
    let failing = write_file(
        dir.path(),
        "fail.bed",
        "1\t0\t4\t10\n1\t4\t8\t3.0\n1\t8\t12\t10\n",
    );
    let sparse = write_file(dir.path(), "sparse.bed", "1\t0\t100\t10\n");

    let output = depthqc(&["validate", &passing, "sample.bam", "--samtools", &samtools]);
    assert!(output.status.success(), "{:?}", output);
    assert!(output.stdout.is_empty());

    let output = depthqc(&["validate", &failing, "sample.bam", "--samtools", &samtools]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "ERROR");
    assert_eq!(lines[1], "10.0 3.0");
    assert_eq!(
        lines[2],
        format!("{} depth -a -Q 1 -r 1:5-8 sample.bam", samtools)
    );

    // windowed over 100bp would be 0.4; sparse divides by the 4 reported rows
    let output = depthqc(&[
        "validate",
        &sparse,
        "sample.bam",
        "--sparse",
        "--samtools",
        &samtools,
    ]);
    assert!(output.status.success(), "{:?}", output);

    let output = depthqc(&["validate", &passing, "sample.bam", "--samtools", &broken]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fail to open file"), "{}", stderr);
}
