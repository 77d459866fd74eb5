use crate::batch::{BatchRunner, CommandLine};
use crate::deriver::ConfigDeriver;
use crate::env::ECCODES_DEFINITION_PATH_VAR;
use crate::error::VerifError;

pub const INTERPRETER: &str = "python3";
pub const SCRIPT: &str = "main.py";

/// Interpolates the experiment's fields onto the observation grid by running
/// the verification tool from the verification home.
pub struct RegridLauncher<'a, B: BatchRunner> {
    deriver: &'a ConfigDeriver,
    batch: B,
}

impl<'a, B: BatchRunner> RegridLauncher<'a, B> {
    pub fn new(deriver: &'a ConfigDeriver, batch: B) -> Self {
        Self { deriver, batch }
    }

    pub fn command(&self) -> CommandLine {
        CommandLine::new(INTERPRETER)
            .arg(SCRIPT)
            .arg("--obs")
            .arg(self.deriver.obs())
            .arg("--case")
            .arg(self.deriver.case().as_str())
            .arg("--exp")
            .arg(self.deriver.exp().as_str())
            .arg("--run_regrid")
            .current_dir(self.deriver.home())
            .env_remove(ECCODES_DEFINITION_PATH_VAR)
    }

    pub fn execute(&self) -> Result<(), VerifError> {
        let command = self.command();
        tracing::info!(
            obs = self.deriver.obs(),
            case = %self.deriver.case(),
            exp = %self.deriver.exp(),
            "starting regrid"
        );
        self.batch.run(&command)
    }
}
