//! Shared helpers: shell scripts standing in for worker and Slurm binaries.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use runwith_core::Settings;

/// Write an executable `#!/bin/sh` script.
pub fn write_exe(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// A worker that answers every package with `value` (raw JSON).
///
/// Pulls the invocation id and result path out of the pretty-printed
/// package with sed, which is enough for paths without quotes.
pub fn fake_worker(dir: &Path, value: &str) -> PathBuf {
    write_exe(
        dir,
        "worker",
        &format!(
            r#"pkg="$2"
inv=$(sed -n 's/.*"invocation": "\([^"]*\)".*/\1/p' "$pkg")
res=$(sed -n 's/.*"result_path": "\([^"]*\)".*/\1/p' "$pkg")
echo "computing"
printf '{{"invocation":"%s","entry":"fake","value":%s}}' "$inv" '{}' > "$res""#,
            value
        ),
    )
}

/// A worker that prints to stderr and exits with `code`.
pub fn failing_worker(dir: &Path, code: i32) -> PathBuf {
    write_exe(
        dir,
        "worker",
        &format!("echo computing\necho 'worker gave up' >&2\nexit {}", code),
    )
}

/// `srun` stand-in: records its arguments, runs the script, exits with its
/// status and reports a task failure the way srun does.
pub fn fake_srun(dir: &Path) -> PathBuf {
    write_exe(
        dir,
        "srun",
        &format!(
            r#"printf '%s\n' "$@" > '{}'
for last; do :; done
sh "$last"
rc=$?
if [ $rc -ne 0 ]; then echo "srun: error: node01: task 0: Exited with exit code $rc" >&2; fi
exit $rc"#,
            dir.join("srun.args").display()
        ),
    )
}

/// `sbatch` stand-in: records arguments, runs the script into `--output`,
/// prints a parsable job id. With `--wait` it exits with the job status.
pub fn fake_sbatch(dir: &Path) -> PathBuf {
    write_exe(
        dir,
        "sbatch",
        &format!(
            r#"printf '%s\n' "$@" > '{}'
out=/dev/null
wait=0
for a; do
  case "$a" in
    --output=*) out="${{a#--output=}}" ;;
    --wait) wait=1 ;;
  esac
  last="$a"
done
sh "$last" > "$out" 2>&1
rc=$?
echo "$rc" > '{}'
echo "4242;cluster"
if [ $wait -eq 1 ]; then exit $rc; fi
exit 0"#,
            dir.join("sbatch.args").display(),
            dir.join("job.rc").display()
        ),
    )
}

/// `sacct` stand-in: reports RUNNING on the first query, then the final
/// state derived from the exit status recorded by [`fake_sbatch`].
pub fn fake_sacct(dir: &Path) -> PathBuf {
    write_exe(
        dir,
        "sacct",
        &format!(
            r#"count='{count}'
n=$(cat "$count" 2>/dev/null || echo 0)
n=$((n + 1))
echo $n > "$count"
if [ $n -lt 2 ]; then echo 'RUNNING|0:0'; exit 0; fi
rc=$(cat '{rc}')
if [ "$rc" -eq 0 ]; then echo 'COMPLETED|0:0'; else echo "FAILED|$rc:0"; fi"#,
            count = dir.join("sacct.count").display(),
            rc = dir.join("job.rc").display()
        ),
    )
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn quiet(work: &Path) -> Settings {
    Settings::default().with_work_dir(work).echo_output(false)
}

pub fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}
