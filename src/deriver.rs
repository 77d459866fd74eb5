use camino::Utf8Path;
use serde::Serialize;

use crate::config::ConfigSource;
use crate::documents::{self, DocumentSource, ExpSettings};
use crate::domain::{BoundingBox, CaseId, DomainGeometry, ExpId, ModelScheme};
use crate::env::VerifEnv;
use crate::error::VerifError;
use crate::projection;
use crate::store::ConfigStore;
use crate::templates;
use crate::times::{self, TimeSeries};

/// Raw time settings of the experiment, parsed on every use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
    pub cycle_length: String,
    pub forecast_range: String,
}

impl TimeRange {
    pub fn series(&self) -> Result<TimeSeries, VerifError> {
        times::compute_time_series(
            &self.start,
            &self.end,
            &self.cycle_length,
            &self.forecast_range,
        )
    }
}

/// Everything derived for one verification run, without side effects.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub case: CaseId,
    pub exp: ExpId,
    pub obs: String,
    pub model: ModelScheme,
    pub case_path: String,
    pub exp_path: String,
    pub archive: String,
    pub file_template: String,
    pub file_glob: String,
    pub ecfs_archive: Option<String>,
    pub span_hours: i64,
    pub bounding_box: BoundingBox,
    pub series: TimeSeries,
}

/// Derives names, paths and dates of a verification exercise from the
/// experiment configuration, and writes the case and experiment documents.
#[derive(Debug, Clone)]
pub struct ConfigDeriver {
    env: VerifEnv,
    store: ConfigStore,
    scheme: ModelScheme,
    times: TimeRange,
    geometry: DomainGeometry,
    file_template: String,
    archive: String,
    ecfs_archive: Option<String>,
    case: CaseId,
    exp: ExpId,
}

impl ConfigDeriver {
    pub fn new<C: ConfigSource + ?Sized>(config: &C, env: VerifEnv) -> Result<Self, VerifError> {
        let experiment = config.raw("general.cnmexp")?;
        let scheme: ModelScheme = config.raw("general.csc")?.parse()?;
        let cycle = config.raw("general.cycle")?;
        let event_type = config.raw("general.event_type")?;
        let domain_name = config.raw("domain.name")?;

        let times = TimeRange {
            start: config.value("general.times.start")?,
            end: config.value("general.times.end")?,
            cycle_length: config.value("general.times.cycle_length")?,
            forecast_range: config.value("general.times.forecast_range")?,
        };
        let geometry = DomainGeometry {
            nimax: config.get_i64("domain.nimax")?,
            njmax: config.get_i64("domain.njmax")?,
            xdx: config.get_f64("domain.xdx")?,
            xdy: config.get_f64("domain.xdy")?,
            xlatcen: config.get_f64("domain.xlatcen")?,
            xloncen: config.get_f64("domain.xloncen")?,
            xlat0: config.get_f64("domain.xlat0")?,
            xlon0: config.get_f64("domain.xlon0")?,
        };

        let file_template = file_template(config)?;
        let archive = archive(config)?;
        let ecfs_archive = match env.ecfs_user.as_deref() {
            Some(user) => Some(ecfs_archive(config, user)?),
            None => None,
        };

        let series = times.series()?;
        let first_init = series.first_init().ok_or_else(|| {
            VerifError::EmptyTimeSeries(format!("{} .. {}", times.start, times.end))
        })?;
        let case = CaseId::new(&event_type, &domain_name, first_init);
        let exp = ExpId::new(&experiment, &cycle, scheme, &domain_name);
        tracing::debug!(%case, %exp, %archive, %file_template, "derived verification settings");

        Ok(Self {
            store: ConfigStore::new(env.home.clone()),
            env,
            scheme,
            times,
            geometry,
            file_template,
            archive,
            ecfs_archive,
            case,
            exp,
        })
    }

    pub fn case(&self) -> &CaseId {
        &self.case
    }

    pub fn exp(&self) -> &ExpId {
        &self.exp
    }

    pub fn obs(&self) -> &str {
        &self.env.obs
    }

    pub fn home(&self) -> &Utf8Path {
        self.env.home()
    }

    pub fn scheme(&self) -> ModelScheme {
        self.scheme
    }

    pub fn file_template(&self) -> &str {
        &self.file_template
    }

    pub fn archive(&self) -> &str {
        &self.archive
    }

    pub fn ecfs_archive(&self) -> Option<&str> {
        self.ecfs_archive.as_deref()
    }

    pub fn compute_time_series(&self) -> Result<TimeSeries, VerifError> {
        self.times.series()
    }

    pub fn compute_bounding_box(&self) -> Result<BoundingBox, VerifError> {
        projection::compute_bounding_box(&self.geometry)
    }

    /// Writes `config/Case/config_<case>.yaml` and returns the case name.
    pub fn write_case_config(&self) -> Result<CaseId, VerifError> {
        let series = self.compute_time_series()?;
        let bbox = self.compute_bounding_box()?;
        let path = self.store.case_path(&self.case);

        let source = DocumentSource::open(&path, &self.store.case_template_path())?;
        let updated = source.is_existing();
        let mut document = documents::build_case_document(source, &series, &bbox)?;
        documents::sort_mappings(&mut document);
        ConfigStore::write_document(&path, &document)?;

        tracing::info!(case = %self.case, %path, updated, "wrote case configuration");
        Ok(self.case.clone())
    }

    /// Writes `config/exp/config_<exp>.yaml` and returns the experiment name.
    pub fn write_exp_config(&self) -> Result<ExpId, VerifError> {
        let series = self.compute_time_series()?;
        let path = self.store.exp_path(&self.exp);
        let settings = ExpSettings {
            model_name: self.scheme.name().to_string(),
            archive: self.archive.clone(),
            filename: self.file_template.clone(),
        };

        let source = DocumentSource::open(&path, &self.store.exp_template_path())?;
        let updated = source.is_existing();
        let mut document = documents::build_exp_document(source, &series, &settings)?;
        documents::sort_mappings(&mut document);
        ConfigStore::write_document(&path, &document)?;

        tracing::info!(
            exp = %self.exp,
            %path,
            cycles = series.len(),
            updated,
            "wrote experiment configuration"
        );
        Ok(self.exp.clone())
    }

    pub fn plan(&self) -> Result<Plan, VerifError> {
        let series = self.compute_time_series()?;
        let bounding_box = self.compute_bounding_box()?;
        let span_hours = times::hours_between(
            times::parse_datetime(&self.times.start)?,
            times::parse_datetime(&self.times.end)?,
        );
        Ok(Plan {
            case: self.case.clone(),
            exp: self.exp.clone(),
            obs: self.env.obs.clone(),
            model: self.scheme,
            case_path: self.store.case_path(&self.case).to_string(),
            exp_path: self.store.exp_path(&self.exp).to_string(),
            archive: self.archive.clone(),
            file_template: self.file_template.clone(),
            file_glob: templates::lead_time_pattern(&self.file_template, None),
            ecfs_archive: self.ecfs_archive.clone(),
            span_hours,
            bounding_box,
            series,
        })
    }
}

fn file_template<C: ConfigSource + ?Sized>(config: &C) -> Result<String, VerifError> {
    let duration_pattern =
        templates::duration_pattern(&config.raw("file_templates.duration.archive")?);
    let duration = config.value("file_templates.duration.archive")?;
    let fullpos = config.value("file_templates.fullpos.archive")?;
    Ok(templates::restore_pattern(&fullpos, &duration, &duration_pattern))
}

fn archive<C: ConfigSource + ?Sized>(config: &C) -> Result<String, VerifError> {
    let timestamp_pattern =
        templates::archive_timestamp_pattern(&config.raw("system.archive_timestamp")?);
    let timestamp = config.system_value("archive_timestamp")?;
    let archive = config.system_value("archive")?;
    Ok(templates::restore_pattern(&archive, &timestamp, &timestamp_pattern))
}

fn ecfs_archive<C: ConfigSource + ?Sized>(config: &C, user: &str) -> Result<String, VerifError> {
    let prefix = config.substitute(&templates::user_prefix(
        &config.raw("archiving.prefix.ecfs")?,
        user,
    ));
    let timestamp_pattern =
        templates::archive_timestamp_pattern(&config.raw("system.archive_timestamp")?);
    let outpath = templates::archive_outpath(
        &config.raw("archiving.hour.ecfs.grib_files.outpath")?,
        &timestamp_pattern,
    );
    Ok(templates::join_remote(&prefix, &outpath))
}
