#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("borelog_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use borelog_engine::parse::{InputTables, RawTable, TableRole};
    use borelog_engine::strata::SoilPalette;
    use borelog_engine::{Diagnostics, RenderConfig, export_html, render_tables};
    use std::fs;
    use std::path::{Path, PathBuf};

    const USAGE: &str = r"borelog_cli (borelog-engine)

USAGE:
  borelog_cli render --surface <csv> --boreholes <csv> --layers <csv> --out <html> [options]
  borelog_cli check --surface <csv> --boreholes <csv> --layers <csv>
  borelog_cli palette

OPTIONS (render):
  --config <json>    Render configuration file
  --h-exag <x>       Horizontal exaggeration (overrides the config file)
  --v-exag <x>       Vertical exaggeration (overrides the config file)
  --grid <n>         Draw the surface as an n x n grid
  --json <path>      Also write the composed scene as JSON
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
";

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "render" => cmd_render(&mut args),
            "check" => cmd_check(&mut args),
            "palette" => {
                print_palette();
                Ok(())
            }
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_palette() {
        for (label, rgb) in SoilPalette::standard().iter() {
            println!("{label:<10} {rgb}");
        }
    }

    #[derive(Default)]
    struct Inputs {
        surface: Option<PathBuf>,
        boreholes: Option<PathBuf>,
        layers: Option<PathBuf>,
    }

    impl Inputs {
        /// Consume an input flag; `Ok(false)` when `arg` is not one.
        fn accept(&mut self, arg: &str, args: &mut Args) -> Result<bool, String> {
            let slot = match arg {
                "--surface" => &mut self.surface,
                "--boreholes" => &mut self.boreholes,
                "--layers" => &mut self.layers,
                _ => return Ok(false),
            };
            *slot = Some(PathBuf::from(args.value(arg)?));
            Ok(true)
        }

        fn read(&self) -> Result<[RawTable; 3], String> {
            let read_one = |role: TableRole, path: Option<&PathBuf>, flag: &str| -> Result<RawTable, String> {
                let path = path.ok_or_else(|| format!("missing {flag}"))?;
                eprintln!("reading {role} from {}", path.display());
                RawTable::from_csv_path(role, path).map_err(|e| e.to_string())
            };
            Ok([
                read_one(TableRole::Surface, self.surface.as_ref(), "--surface")?,
                read_one(TableRole::Boreholes, self.boreholes.as_ref(), "--boreholes")?,
                read_one(TableRole::Layers, self.layers.as_ref(), "--layers")?,
            ])
        }
    }

    fn cmd_render(args: &mut Args) -> Result<(), String> {
        let mut inputs = Inputs::default();
        let mut out: Option<PathBuf> = None;
        let mut json_out: Option<PathBuf> = None;
        let mut config_path: Option<PathBuf> = None;
        let mut h_exag: Option<f64> = None;
        let mut v_exag: Option<f64> = None;
        let mut grid: Option<usize> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            if inputs.accept(&arg, args)? {
                continue;
            }
            match arg.as_str() {
                "--out" => out = Some(PathBuf::from(args.value("--out")?)),
                "--json" => json_out = Some(PathBuf::from(args.value("--json")?)),
                "--config" => config_path = Some(PathBuf::from(args.value("--config")?)),
                "--h-exag" => h_exag = Some(parse_number(&args.value("--h-exag")?, "--h-exag")?),
                "--v-exag" => v_exag = Some(parse_number(&args.value("--v-exag")?, "--v-exag")?),
                "--grid" => grid = Some(parse_count(&args.value("--grid")?, "--grid")?),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let out = out.ok_or("missing --out")?;
        ensure_writable(&out, overwrite)?;
        if let Some(path) = json_out.as_ref() {
            ensure_writable(path, overwrite)?;
        }

        let mut config = match config_path {
            Some(path) => RenderConfig::from_json_file(&path).map_err(|e| e.to_string())?,
            None => RenderConfig::default(),
        };
        if let Some(h) = h_exag {
            config.horizontal_exaggeration = h;
        }
        if let Some(v) = v_exag {
            config.vertical_exaggeration = v;
        }
        if grid.is_some() {
            config.grid_resolution = grid;
        }

        let [surface, boreholes, layers] = inputs.read()?;
        let output =
            render_tables(surface, boreholes, layers, &config).map_err(|e| e.to_string())?;
        report_warnings(&output.warnings);

        if let Some(path) = json_out.as_ref() {
            let json = output.scene.to_json().map_err(|e| format!("scene json: {e}"))?;
            write_text_file(path, &json)?;
            eprintln!("wrote {}", path.display());
        }
        export_html(&output.scene, &out).map_err(|e| e.to_string())?;
        eprintln!(
            "wrote {} ({} boreholes, {} segments)",
            out.display(),
            output.scene.columns.len(),
            output.scene.segment_count()
        );
        Ok(())
    }

    fn cmd_check(args: &mut Args) -> Result<(), String> {
        let mut inputs = Inputs::default();
        while let Some(arg) = args.next() {
            if inputs.accept(&arg, args)? {
                continue;
            }
            match arg.as_str() {
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let [surface, boreholes, layers] = inputs.read()?;
        let (tables, mut row_warnings) =
            InputTables::from_raw(surface, boreholes, layers).map_err(|e| e.to_string())?;
        let output = borelog_engine::render(&tables, &RenderConfig::default())
            .map_err(|e| e.to_string())?;

        let mut warnings = Diagnostics::new();
        warnings.append(&mut row_warnings);
        warnings.append(&mut output.warnings.into_vec());
        report_warnings(&warnings);
        println!(
            "{} surface points, {} boreholes, {} layers, {} warning(s)",
            tables.surface.len(),
            tables.boreholes.len(),
            tables.layers.len(),
            warnings.len()
        );
        Ok(())
    }

    fn report_warnings(warnings: &Diagnostics) {
        for warning in warnings {
            eprintln!("warning: {warning}");
        }
    }

    fn parse_number(text: &str, flag: &str) -> Result<f64, String> {
        text.parse::<f64>()
            .map_err(|_| format!("{flag} expects a number, got `{text}`"))
    }

    fn parse_count(text: &str, flag: &str) -> Result<usize, String> {
        text.parse::<usize>()
            .map_err(|_| format!("{flag} expects a whole number, got `{text}`"))
    }

    fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    fn write_text_file(path: &Path, text: &str) -> Result<(), String> {
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
