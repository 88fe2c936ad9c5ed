/// End-to-end tests for the symbdump binary
/// Tests cover: dump, limits, stats, corrupt input, keep-going, reencode, env config
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use symbfile::{InlineFrame, LineTable, Range, Reader, Record, ReturnPad, Writer, WriterConfig};
use tempfile::tempdir;

/// Helper to run symbdump and capture its output
fn run_symbdump(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_symbdump"));
    cmd.args(args);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().expect("Failed to run symbdump")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Writes a small symbfile: `n` functions, each with one inlined child,
/// and a return pad every other function.
fn write_sample(path: &Path, n: u64) {
    let mut w = Writer::create(path, WriterConfig::default()).unwrap();
    w.write_header().unwrap();
    for i in 0..n {
        let base = 0x4000 + i * 0x80;
        let mut outer = Range::new(base, 0x60, format!("fn_{}", i % 4));
        outer.file = Some("lib.rs".into());
        outer.line_table = LineTable::from_pairs([(0, 100), (0x20, 104)]);
        w.write_range(&outer).unwrap();

        let mut inner = Range::new(base + 0x20, 0x10, "inlined");
        inner.depth = 1;
        inner.file = Some("util.rs".into());
        inner.call_line = 104;
        w.write_range(&inner).unwrap();

        if i % 2 == 0 {
            w.write_return_pad(&ReturnPad::new(
                base + 0x30,
                vec![
                    InlineFrame::new(format!("fn_{}", i % 4), "lib.rs", 104),
                    InlineFrame::new("inlined", "util.rs", 12),
                ],
            ))
            .unwrap();
        }
    }
    w.finish().unwrap();
}

fn read_records(path: &Path) -> Vec<Record> {
    Reader::open(path)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_dump_prints_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.symbfile");
    write_sample(&path, 2);

    let output = run_symbdump(&["dump", path_str(&path)], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("header"));
    assert!(text.contains("range 0x4000..0x4060 depth=0 func=fn_0 file=lib.rs"));
    assert!(text.contains("func=inlined file=util.rs call=lib.rs:104"));
    assert!(text.contains("return_pad 0x4030 [fn_0@lib.rs:104 > inlined@util.rs:12]"));
    assert_eq!(text.lines().count(), read_records(&path).len());
}

#[test]
fn test_dump_limit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.symbfile");
    write_sample(&path, 10);

    let output = run_symbdump(&["dump", path_str(&path), "--limit", "3"], &[]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().count(), 3);
}

#[test]
fn test_stats_counts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.symbfile");
    write_sample(&path, 6);

    let output = run_symbdump(&["stats", path_str(&path)], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("headers:       1"));
    assert!(text.contains("ranges:        12"));
    assert!(text.contains("return_pads:   3"));
    assert!(text.contains("max_depth:     1"));
    assert!(text.contains("line_rows:     12"));
    let size = fs::metadata(&path).unwrap().len();
    assert!(text.contains(&format!("bytes:         {}", size)));
}

#[test]
fn test_bad_magic_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.symbfile");
    fs::write(&path, b"not a symbfile at all").unwrap();

    let output = run_symbdump(&["stats", path_str(&path)], &[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("bad magic"));
}

#[test]
fn test_missing_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.symbfile");

    let output = run_symbdump(&["dump", path_str(&path)], &[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to open"));
}

#[test]
fn test_truncated_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.symbfile");
    write_sample(&path, 4);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

    let output = run_symbdump(&["stats", path_str(&path), "--keep-going"], &[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("truncated record"));
}

#[test]
fn test_stats_keep_going() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mixed.symbfile");
    let mut bytes = b"symbfile\x00\x01".to_vec();
    bytes.extend_from_slice(&[0x01, 0x02, 0xFF]); // undecodable RangeV1
    bytes.extend_from_slice(&[0x02, 0x63, 0xAB, 0xCD]); // unknown type 99
    fs::write(&path, &bytes).unwrap();

    let strict = run_symbdump(&["stats", path_str(&path)], &[]);
    assert!(!strict.status.success());

    let lenient = run_symbdump(&["stats", path_str(&path), "--keep-going"], &[]);
    assert!(lenient.status.success(), "stderr: {}", stderr(&lenient));
    let text = stdout(&lenient);
    assert!(text.contains("invalid:       1"));
    assert!(text.contains("unknown:       1"));
}

#[test]
fn test_reencode_preserves_records() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.symbfile");
    let output_path = dir.path().join("out.symbfile");
    write_sample(&input, 8);

    let output = run_symbdump(&["reencode", path_str(&input), path_str(&output_path)], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("wrote 16 ranges, 4 return pads"));

    // same default policy, so the bytes match too
    assert_eq!(fs::read(&input).unwrap(), fs::read(&output_path).unwrap());
}

#[test]
fn test_reencode_honours_env_config() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.symbfile");
    let output_path = dir.path().join("out.symbfile");
    write_sample(&input, 8);

    let output = run_symbdump(
        &["reencode", path_str(&input), path_str(&output_path)],
        &[
            ("SYMBFILE_INTERN_THRESHOLD", "0"),
            ("SYMBFILE_DELTA_ADDRESSES", "false"),
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let strip = |recs: Vec<Record>| -> Vec<Record> {
        recs.into_iter()
            .filter(|r| !matches!(r, Record::StringTable(_)))
            .collect()
    };
    assert_eq!(
        strip(read_records(&input)),
        strip(read_records(&output_path))
    );
    assert_ne!(fs::read(&input).unwrap(), fs::read(&output_path).unwrap());
}
