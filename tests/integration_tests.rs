//! Integration Tests

#[macro_use]
extern crate lazy_static;


use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;

use workdir::{stderr, stdout, WorkDir};

struct ScriptData<'a> {
    pub script: &'a str,
    pub stdout: &'a str,
}

lazy_static! {
    static ref SCRIPTS_MAP: HashMap<&'static str, ScriptData<'static>> = {
        let mut map = HashMap::new();
        map.insert("simple_echo.smallsh", ScriptData {
            script: "echo test\n",
            stdout: "test\n",
        });
        map.insert("simple_redirects.smallsh", ScriptData {
            script: "echo test output > out.txt\ncat < out.txt\n",
            stdout: "test output\n",
        });
        map.insert("simple_status.smallsh", ScriptData {
            script: "false\nstatus\ntrue\nstatus\n",
            stdout: "exit value 1\nexit value 0\n",
        });
        map.insert("simple_comments.smallsh", ScriptData {
            script: "# nothing\n\n#echo hidden\necho shown\n",
            stdout: "shown\n",
        });
        map.insert("simple_literal_background_marker.smallsh", ScriptData {
            script: "echo a & b\n",
            stdout: "a & b\n",
        });
        map.insert("simple_markers_inside_words.smallsh", ScriptData {
            script: "echo <in >out a&\n",
            stdout: "<in >out a&\n",
        });
        map.insert("simple_exit.smallsh", ScriptData {
            script: "echo before\nexit\necho after\n",
            stdout: "before\n",
        });
        map
    };
}

#[test]
fn test_all_simple_scripts() {
    for (name, expected) in SCRIPTS_MAP.iter() {
        let wd = WorkDir::new("smallsh-script");
        let script_path = wd.create_file(name, expected.script);
        let output = wd.run_command(wd.command(&[&script_path]), "");
        assert!(output.status.success(), "{} failed: {:?}", name, output);
        assert_eq!(stdout(&output), expected.stdout, "script {}", name);
    }
}

#[test]
fn prompt_and_exit() {
    let wd = WorkDir::new("smallsh-prompt");
    let output = wd.run("echo hello\nexit\n");
    assert_eq!(stdout(&output), ": hello\n: ");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn end_of_input_exits_cleanly() {
    let wd = WorkDir::new("smallsh-eof");
    let output = wd.run("echo a\n");
    assert_eq!(stdout(&output), ": a\n: ");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn blank_and_comment_lines() {
    let wd = WorkDir::new("smallsh-comments");
    let output = wd.run("# comment\n\necho ok\n");
    assert_eq!(stdout(&output), ": : : ok\n: ");
    assert!(stderr(&output).is_empty());
}

#[test]
fn pid_expansion() {
    let wd = WorkDir::new("smallsh-pid");
    let (pid, output) = wd.run_command_with_pid(wd.command(Vec::<&str>::new()), "echo $$\n");
    assert_eq!(stdout(&output), format!(": {}\n: ", pid));
}

#[test]
fn status_reports_exit_code() {
    let wd = WorkDir::new("smallsh-status");
    wd.create_file("exit2.sh", "exit 2\n");
    let output = wd.run("sh exit2.sh\nstatus\n");
    assert!(stdout(&output).contains("exit value 2\n"));
}

#[test]
fn status_reports_terminating_signal() {
    let wd = WorkDir::new("smallsh-signal");
    wd.create_file("term.sh", "kill -15 $$\n");
    let output = wd.run("sh term.sh\nstatus\n");
    assert!(stdout(&output).contains("terminated by signal 15\n"));
}

#[test]
fn children_start_with_default_sigpipe() {
    let wd = WorkDir::new("smallsh-sigpipe");
    wd.create_file("pipe.sh", "kill -PIPE $$\n");
    let output = wd.run("sh pipe.sh\nstatus\n");
    assert!(stdout(&output).contains("terminated by signal 13\n"));
}

#[test]
fn unknown_command_is_reported() {
    let wd = WorkDir::new("smallsh-unknown");
    let output = wd.run("definitely_not_a_command_xyz\nstatus\necho alive\n");
    assert!(stderr(&output)
        .contains("smallsh: definitely_not_a_command_xyz: No such file or directory"));
    let out = stdout(&output);
    assert!(out.contains("exit value 1\n"));
    assert!(out.contains("alive\n"));
}

#[test]
fn redirection_leaves_shell_streams_alone() {
    let wd = WorkDir::new("smallsh-redirect");
    wd.create_file("in.txt", "b\na\n");
    let output = wd.run("sort < in.txt > out.txt\necho after\n");
    assert_eq!(wd.read_file("out.txt"), "a\nb\n");
    assert_eq!(stdout(&output), ": : after\n: ");
}

#[test]
fn output_redirection_truncates_and_sets_mode() {
    let wd = WorkDir::new("smallsh-truncate");
    wd.create_file("out.txt", "a much longer line than the new contents\n");
    wd.run("echo hi > out.txt\necho new > created.txt\n");
    assert_eq!(wd.read_file("out.txt"), "hi\n");

    let mode = fs::metadata(wd.path().join("created.txt"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o600, 0o600);
    assert_eq!(mode & !0o644 & 0o777, 0);
}

#[test]
fn missing_input_file_aborts_only_that_command() {
    let wd = WorkDir::new("smallsh-badfile");
    let output = wd.run("cat < missing.txt\necho still here\n");
    assert!(stderr(&output).contains("smallsh: missing.txt: No such file or directory"));
    assert!(stdout(&output).contains("still here\n"));
}

#[test]
fn cd_failure_keeps_directory() {
    let wd = WorkDir::new("smallsh-cd-fail");
    let output = wd.run("cd nonexistent_dir\npwd -P\n");
    assert!(stderr(&output).contains("smallsh: cd: nonexistent_dir: No such file or directory"));
    let expected = format!("{}\n", wd.canonical_path().display());
    assert!(stdout(&output).contains(&expected));
}

#[test]
fn cd_changes_directory_for_children() {
    let wd = WorkDir::new("smallsh-cd");
    fs::create_dir(wd.path().join("sub")).unwrap();
    let output = wd.run("cd sub\npwd -P\n");
    let expected = format!("{}\n", wd.canonical_path().join("sub").display());
    assert!(stdout(&output).contains(&expected));
}

#[test]
fn cd_without_arguments_goes_home() {
    let wd = WorkDir::new("smallsh-cd-home");
    let home = wd.path().join("home");
    fs::create_dir(&home).unwrap();
    let mut cmd = wd.command(Vec::<&str>::new());
    cmd.env("HOME", &home);
    let output = wd.run_command(cmd, "cd\npwd -P\n");
    let expected = format!("{}\n", fs::canonicalize(&home).unwrap().display());
    assert!(stdout(&output).contains(&expected));
}

#[test]
fn background_job_is_announced_and_reported() {
    let wd = WorkDir::new("smallsh-background");
    let output = wd.run("ls -l & \nsleep 1\necho next\n");
    let out = stdout(&output);

    let announce = "background pid is ";
    let start = out.find(announce).expect("no background announcement") + announce.len();
    let pid: String = out[start..].chars().take_while(char::is_ascii_digit).collect();
    assert!(!pid.is_empty());

    let done = format!("background pid {} is done: exit value 0\n", pid);
    let done_at = out.find(&done).expect("no completion notice");
    assert!(done_at > start);
    assert!(out.contains("next\n"));
}

#[test]
fn background_capacity_is_enforced() {
    let wd = WorkDir::new("smallsh-capacity");
    let input = "sleep 2 &\n".repeat(6);
    let output = wd.run(&input);
    assert_eq!(stdout(&output).matches("background pid is ").count(), 5);
    assert!(stderr(&output).contains("smallsh: too many background jobs (limit 5)"));
}

#[test]
fn configured_job_capacity() {
    let wd = WorkDir::new("smallsh-jobs-flag");
    let output = wd.run_command(wd.command(&["--jobs=0"]), "true &\necho ok\n");
    assert!(stderr(&output).contains("too many background jobs (limit 0)"));
    assert!(!stdout(&output).contains("background pid is"));
    assert!(stdout(&output).contains("ok\n"));
}

#[test]
fn overlong_line_is_fatal() {
    let wd = WorkDir::new("smallsh-long");
    let input = format!("echo {}\necho unreachable\n", "a".repeat(3000));
    let output = wd.run(&input);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("command length maximum exceeded"));
    assert!(!stdout(&output).contains("unreachable"));
}

#[test]
fn version_flag() {
    let wd = WorkDir::new("smallsh-version");
    let output = wd.run_command(wd.command(&["--version"]), "");
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("smallsh version "));
}
