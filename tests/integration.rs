use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn poems_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("poems");
    path
}

const JINGYESI: &str = "INSERT INTO `poems` (`category`,`dynasty`,`title`,`author`,`rhythmic`,`chapter`,`section`,`notes`,`paragraphs`) \
    VALUES ('shi','tang','静夜思','李白','','','','','床前明月光,|疑是地上霜。');";

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let repo = root.join("repo");
    for dir in ["json", "ci", "yuanqu", "shijing"] {
        fs::create_dir_all(repo.join(dir)).unwrap();
    }

    fs::write(
        repo.join("json").join("poet.tang.0.json"),
        r#"[
  {"title": "静夜思", "author": "李白", "paragraphs": ["床前明月光,", "疑是地上霜。"]},
  {"title": "一二三四五六七八九十一二三四五六七八九十一二三四五六七八九十一", "author": "无名", "paragraphs": ["句"]},
  {"title": "空", "author": "无名"}
]"#,
    )
    .unwrap();
    fs::write(
        repo.join("json").join("poet.song.0.json"),
        r#"[{"title": "題西林壁", "author": "蘇軾", "paragraphs": ["橫看成嶺側成峰，", "遠近高低各不同。"]}]"#,
    )
    .unwrap();
    fs::write(
        repo.join("ci").join("ci.song.0.json"),
        r#"[{"rhythmic": "念奴嬌", "author": "蘇軾", "paragraphs": ["大江東去，浪淘盡，千古風流人物。"], "notes": ["赤壁懷古"]},
{"rhythmic": "□□", "author": "佚名", "paragraphs": ["殘"]}]"#,
    )
    .unwrap();
    fs::write(
        repo.join("yuanqu").join("yuanqu.json"),
        "[\n\
         {\"title\": \"天淨沙·秋思\", \"author\": \"馬致遠\", \"paragraphs\": [\"枯藤老樹昏鴉\", \"小橋流水人家\"]},\n\
         {\"title\": \"山坡羊·潼關懷古\", \"author\": \"張養浩\", \"paragraphs\": [\"峰巒如聚\"]}\n\
         ]]\n",
    )
    .unwrap();
    fs::write(
        repo.join("shijing").join("shijing.json"),
        r#"[{"title": "關雎", "chapter": "國風", "section": "周南", "content": ["關關雎鳩，在河之洲。"]}]"#,
    )
    .unwrap();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[paths]
repo = "{}/repo"
output = "{}/output"

[db]
schema = "{}/sql/create_table.sql"
"#,
        root.display(),
        root.display(),
        env!("CARGO_MANIFEST_DIR")
    );
    let config_path = config_dir.join("poems.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_poems(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = poems_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("--progress")
        .arg("off")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run poems binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn output_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("output")
}

#[test]
fn test_run_full_pipeline() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_poems(&config_path, &["run"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("accepted: 6"), "stdout={}", stdout);
    assert!(stdout.contains("dropped (no body): 1"));
    assert!(stdout.contains("dropped (title too long): 1"));
    assert!(stdout.contains("dropped (placeholder glyph): 1"));
    assert!(stdout.contains("rows: 6"));
    assert!(stdout.trim_end().ends_with("ok"));

    assert!(output_dir(&tmp).join("database").join("poems.db").exists());
}

#[test]
fn test_jingyesi_statement() {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_poems(&config_path, &["export"]);
    assert!(success, "export failed: {}", stderr);

    let hant = fs::read_to_string(output_dir(&tmp).join("sql").join("poems_hant.sql")).unwrap();
    assert_eq!(hant.lines().next(), Some(JINGYESI));
    assert!(!hant.contains("一二三四五六七八九十一二三四五六七八九十一二三四五六七八九十一"));
}

#[test]
fn test_streams_have_same_line_count() {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_poems(&config_path, &["run"]);
    assert!(success, "run failed: {}", stderr);

    let sql = output_dir(&tmp).join("sql");
    let hant = fs::read_to_string(sql.join("poems_hant.sql")).unwrap();
    let hans = fs::read_to_string(sql.join("poems_hans.sql")).unwrap();
    assert_eq!(hant.lines().count(), 6);
    assert_eq!(hans.lines().count(), 6);

    assert!(hant.contains("'題西林壁','蘇軾'"));
    assert!(hans.contains("'题西林壁','苏轼'"));
    assert!(hans.contains("'qu','yuan','天净沙·秋思','马致远'"));
    assert!(hans.contains("'shige','zhou','关雎','','','国风','周南'"));
}

#[test]
fn test_export_idempotent() {
    let (tmp, config_path) = setup_test_env();
    let hant_path = output_dir(&tmp).join("sql").join("poems_hant.sql");

    let (stdout1, _, success1) = run_poems(&config_path, &["export"]);
    assert!(success1);
    let first = fs::read(&hant_path).unwrap();

    let (stdout2, _, success2) = run_poems(&config_path, &["export"]);
    assert!(success2);
    let second = fs::read(&hant_path).unwrap();

    assert_eq!(first, second);
    let digest = |s: &str| {
        s.lines()
            .find(|l| l.trim_start().starts_with("sha256:"))
            .map(str::to_string)
    };
    assert_eq!(digest(&stdout1), digest(&stdout2));
}

#[test]
fn test_transcode_requires_export() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_poems(&config_path, &["transcode"]);
    assert!(!success);
    assert!(stderr.contains("poems export"));
}

#[test]
fn test_sources_lists_groups() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_poems(&config_path, &["sources"]);
    assert!(success, "sources failed: {}", stderr);
    assert!(stdout.contains("shi:tang"));
    assert!(stdout.contains("qu:yuan"));
    assert!(stdout.contains("lines"));
}

#[test]
fn test_stats_after_run() {
    let (_tmp, config_path) = setup_test_env();
    run_poems(&config_path, &["run"]);

    let (stdout, stderr, success) = run_poems(&config_path, &["stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("Poems:     6"));
    assert!(stdout.contains("shige"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_poems(&tmp.path().join("nope.toml"), &["run"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
