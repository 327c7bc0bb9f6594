// Runs the compiled binary with piped stdin. Stdout is not a terminal here,
// so output is uncolored and no chart is drawn.

use assert_cmd::Command;
use tempfile::TempDir;

fn mathquest(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mathquest").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn prompts_then_quits_cleanly() {
    let home = TempDir::new().unwrap();
    let out = stdout_of(mathquest(&home).write_stdin("Ada\n5\n2\nquit\n"));

    assert!(out.contains("Enter your name: "));
    assert!(out.contains("Hi Ada!"));
    assert!(out.contains("Please choose from: 1, 2, 3"));
    assert!(out.contains("Starting at MEDIUM level!"));
    assert!(out.contains("Question 1 | Difficulty: MEDIUM"));
    assert!(out.contains("No questions answered"));
}

#[test]
fn end_of_input_behaves_like_quit() {
    let home = TempDir::new().unwrap();
    let out = stdout_of(mathquest(&home).args(["--name", "Ada", "-d", "easy"]).write_stdin(""));
    assert!(out.contains("Thanks for practicing!"));
    assert!(out.contains("No questions answered"));
}

#[test]
fn wrong_answers_lower_the_difficulty() {
    let home = TempDir::new().unwrap();
    let out = stdout_of(
        mathquest(&home)
            .args(["--name", "Ada", "-d", "hard", "-n", "3", "--seed", "4"])
            .write_stdin("abc\n-100000\n-100000\n-100000\n"),
    );

    assert!(out.contains("Please enter a number!"));
    assert_eq!(out.matches("Incorrect. The answer was").count(), 3);
    assert!(out.contains("Adjusting to MEDIUM"));
    assert!(out.contains("Total questions: 3"));
    assert!(out.contains("Final difficulty: MEDIUM"));
    assert!(out.contains("PERSONALIZED RECOMMENDATIONS:"));
    assert!(!out.contains('\u{1b}'), "escape codes in piped output");
}

#[test]
fn json_summary() {
    let home = TempDir::new().unwrap();
    let out = stdout_of(
        mathquest(&home)
            .args(["--name", "Ada", "-d", "easy", "-n", "3", "--json"])
            .write_stdin("-100000\n-100000\n-100000\n"),
    );
    let start = out.find("\n{").expect("json object in output");
    let json: serde_json::Value = serde_json::from_str(&out[start..]).unwrap();
    assert_eq!(json["summary"]["learner"], "Ada");
    assert_eq!(json["summary"]["final_difficulty"], "easy");
    assert_eq!(json["history"][0]["evaluation"]["decision"], "decrease");
}

#[test]
fn save_config_then_reuse_it() {
    let home = TempDir::new().unwrap();
    mathquest(&home)
        .args(["--name", "Grace", "-d", "medium", "--save-config"])
        .write_stdin("")
        .assert()
        .success();

    let path = home.path().join("mathquest").join("config.json");
    let saved: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved["learner_name"], "Grace");
    assert_eq!(saved["starting_difficulty"], "medium");

    // saved defaults skip both prompts
    let out = stdout_of(mathquest(&home).write_stdin("quit\n"));
    assert!(!out.contains("Enter your name: "));
    assert!(out.contains("Starting at MEDIUM level!"));
}

#[test]
fn rejects_unknown_difficulty() {
    let home = TempDir::new().unwrap();
    mathquest(&home)
        .args(["-d", "extreme"])
        .assert()
        .failure();
}
