use std::io::{self, Write};

use serde::Serialize;

use crate::deriver::Plan;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_plan(plan: &Plan) -> io::Result<()> {
        Self::print_json(plan)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_plan(plan: &Plan) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        Self::write_plan(&mut stdout, plan)
    }

    pub fn write_plan<W: Write>(out: &mut W, plan: &Plan) -> io::Result<()> {
        writeln!(out, "case:          {}", plan.case)?;
        writeln!(out, "experiment:    {}", plan.exp)?;
        writeln!(out, "observations:  {}", plan.obs)?;
        writeln!(out, "model:         {}", plan.model)?;
        writeln!(out, "case config:   {}", plan.case_path)?;
        writeln!(out, "exp config:    {}", plan.exp_path)?;
        writeln!(out, "archive:       {}", plan.archive)?;
        writeln!(out, "filename:      {}", plan.file_template)?;
        writeln!(out, "file glob:     {}", plan.file_glob)?;
        if let Some(ecfs) = &plan.ecfs_archive {
            writeln!(out, "ecfs archive:  {ecfs}")?;
        }
        let bbox = plan.bounding_box;
        writeln!(
            out,
            "domain:        lon {:.4} .. {:.4}, lat {:.4} .. {:.4}",
            bbox.lon_min, bbox.lon_max, bbox.lat_min, bbox.lat_max
        )?;
        writeln!(
            out,
            "cycles:        {} over {} h",
            plan.series.len(),
            plan.span_hours
        )?;
        for (init, fcst) in plan.series.pairs() {
            writeln!(out, "  {init} -> {fcst}")?;
        }
        Ok(())
    }
}
