use std::path::PathBuf;

use clap::Parser;

use crate::backend::Backend;

#[derive(Debug, Parser)]
#[command(about, long_about = None)]
pub struct DanceCli {
    /// Names of the projects to run. All projects in the projects directory are run if none are
    /// given.
    ///
    /// A project's name is its file name without the `.yml` or `.yaml` extension.
    pub projects: Vec<String>,

    /// Directory containing one YAML document per project.
    ///
    /// Relative `dir` parameters in the documents are resolved against this directory.
    #[clap(long, default_value = "projects")]
    pub projects_dir: PathBuf,

    /// The reference backend, whose behaviour is taken as correct, in the format `name=uri`.
    #[clap(long, default_value = "mongodb=mongodb://127.0.0.1:47017/", value_parser = parse_backend)]
    pub reference: Backend,

    /// The backend under test, in the format `name=uri`.
    #[clap(long, default_value = "ferretdb=mongodb://127.0.0.1:27017/", value_parser = parse_backend)]
    pub target: Backend,

    /// The number of seconds a single setup or test case instruction may run for
    #[clap(long, default_value = "300")]
    pub timeout: u64,

    /// The number of test cases of one suite to run at once against each backend.
    ///
    /// Defaults to all test cases of the suite.
    #[clap(long, short)]
    pub jobs: Option<usize>,

    /// Write a JSON report to this path
    #[clap(long)]
    pub report: Option<PathBuf>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// An identifier for this run, included in reports. A random one is generated if not given.
    #[clap(long)]
    pub run_id: Option<String>,
}

fn parse_backend(s: &str) -> anyhow::Result<Backend> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults() {
        let cli = DanceCli::try_parse_from(["dance"]).expect("defaults should parse");

        assert!(cli.projects.is_empty());
        assert_eq!(PathBuf::from("projects"), cli.projects_dir);
        assert_eq!(Backend::new("mongodb", "mongodb://127.0.0.1:47017/"), cli.reference);
        assert_eq!(Backend::new("ferretdb", "mongodb://127.0.0.1:27017/"), cli.target);
        assert_eq!(300, cli.timeout);
        assert_eq!(None, cli.jobs);
        assert!(!cli.no_progress);
    }

    #[test]
    fn all_options() {
        let cli = DanceCli::try_parse_from([
            "dance",
            "floats",
            "ycsb",
            "--projects-dir",
            "/srv/projects",
            "--reference",
            "mongo7=mongodb://db:27017/",
            "--target",
            "ferretdb-pg=mongodb://ferret:27017/",
            "--timeout",
            "5",
            "-j",
            "2",
            "--report",
            "report.json",
            "--no-progress",
            "--run-id",
            "ci-42",
        ])
        .expect("options should parse");

        assert_eq!(vec!["floats", "ycsb"], cli.projects);
        assert_eq!(Backend::new("ferretdb-pg", "mongodb://ferret:27017/"), cli.target);
        assert_eq!(Some(2), cli.jobs);
        assert_eq!(Some(PathBuf::from("report.json")), cli.report);
        assert_eq!(Some("ci-42".to_string()), cli.run_id);
        assert!(cli.no_progress);
    }

    #[test]
    fn invalid_backend() {
        assert!(DanceCli::try_parse_from(["dance", "--target", "ferretdb"]).is_err());
    }
}
