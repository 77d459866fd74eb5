mod common;

use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8Path;

use verif_config::batch::{BatchRunner, CommandLine};
use verif_config::deriver::ConfigDeriver;
use verif_config::env::VerifEnv;
use verif_config::error::VerifError;
use verif_config::regrid::RegridLauncher;

use common::sample_config;

#[derive(Default)]
struct RecordingBatch {
    calls: Mutex<Vec<CommandLine>>,
}

impl BatchRunner for &RecordingBatch {
    fn run(&self, command: &CommandLine) -> Result<(), VerifError> {
        self.calls.lock().unwrap().push(command.clone());
        Ok(())
    }
}

struct FailingBatch;

impl BatchRunner for FailingBatch {
    fn run(&self, command: &CommandLine) -> Result<(), VerifError> {
        Err(VerifError::SubprocessFailure {
            command: command.to_string(),
            message: "exited with status 1".to_string(),
        })
    }
}

#[test]
fn launches_regrid_from_home_with_derived_arguments() {
    let env = VerifEnv::new("/verif").with_obs("OPERA_pcp");
    let deriver = ConfigDeriver::new(&sample_config(), env).unwrap();
    let batch = RecordingBatch::default();

    RegridLauncher::new(&deriver, &batch).execute().unwrap();

    let calls = batch.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let command = &calls[0];
    assert_eq!(
        command.to_string(),
        "python3 main.py --obs OPERA_pcp --case flood_SPAIN_20230101 --exp DEOD_cy46h1_AR_SPAIN --run_regrid"
    );
    assert_eq!(command.current_dir.as_deref(), Some(Utf8Path::new("/verif")));
    assert_eq!(command.env_remove, ["ECCODES_DEFINITION_PATH"]);
}

#[test]
fn launching_does_not_touch_process_state() {
    let cwd = std::env::current_dir().unwrap();
    let deriver = ConfigDeriver::new(&sample_config(), VerifEnv::new("/verif")).unwrap();
    let batch = RecordingBatch::default();

    RegridLauncher::new(&deriver, &batch).execute().unwrap();

    assert_eq!(std::env::current_dir().unwrap(), cwd);
}

#[test]
fn subprocess_failure_is_propagated() {
    let deriver = ConfigDeriver::new(&sample_config(), VerifEnv::new("/verif")).unwrap();
    let err = RegridLauncher::new(&deriver, FailingBatch).execute().unwrap_err();
    assert_matches!(
        err,
        VerifError::SubprocessFailure { command, .. } if command.contains("--run_regrid")
    );
}
