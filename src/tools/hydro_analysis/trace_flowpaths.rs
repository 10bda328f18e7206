/*
This tool is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 21/05/2024
Last Modified: 17/06/2024
License: MIT
*/
use crate::bem::BemWorkspace;
use crate::catchment::Catchment;
use crate::flow::{streamline_loop, FlowDirection};
use crate::io_utils::{create_output_file, prefixed_path, resolve_data_dir};
use crate::structures::{Contour, Point2D, RasterGrid};
use crate::tools::{FlowpathTool, ParameterType, ToolParameter};
use crate::utils::get_formatted_elapsed_time;
use std::env;
use std::io::{Error, ErrorKind, Write};
use std::path;
use std::time::Instant;

/// This tool traces streamlines of a contour-bounded catchment from a
/// grid of seed points (`--seeds`, in the raster-grid form). Each trace
/// follows the gradient upslope (or downslope with `--direction=descend`)
/// until it leaves the catchment or exhausts the step budget. Traces are
/// written as `x y` pairs, one point per line, separated by blank lines.
///
/// # See Also
/// `CatchmentArea`, `RunoffRisk`
pub struct TraceFlowpaths {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl TraceFlowpaths {
    pub fn new() -> TraceFlowpaths {
        // public constructor
        let name = "TraceFlowpaths".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description = "Traces streamlines from a grid of seed points.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Catchment File".to_owned(),
            flags: vec!["--catchment".to_owned()],
            description: "Input catchment description file.".to_owned(),
            parameter_type: ParameterType::ExistingFile,
            default_value: Some("catchment.txt".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Seed Grid".to_owned(),
            flags: vec!["--seeds".to_owned()],
            description: "Seed grid, e.g. 'P(0,0) = (0.2,0.0) P(5,5) = (0.4,0.0)'.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: false,
        });
        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output streamline trace file.".to_owned(),
            parameter_type: ParameterType::NewFile,
            default_value: Some("flowpaths.out".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Integration Step Size".to_owned(),
            flags: vec!["--step_size".to_owned()],
            description: "Streamline integration step size.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.01".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Maximum Steps".to_owned(),
            flags: vec!["--max_steps".to_owned()],
            description: "Maximum number of integration steps per streamline.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("500".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Flow Direction".to_owned(),
            flags: vec!["--direction".to_owned()],
            description: "Trace direction, 'ascend' or 'descend'.".to_owned(),
            parameter_type: ParameterType::OptionList(vec![
                "ascend".to_owned(),
                "descend".to_owned(),
            ]),
            default_value: Some("ascend".to_owned()),
            optional: true,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let p = format!("{}", env::current_dir().unwrap().display());
        let e = format!("{}", env::current_exe().unwrap().display());
        let mut short_exe = e
            .replace(&p, "")
            .replace(".exe", "")
            .replace('.', "")
            .replace(&sep, "");
        if e.contains(".exe") {
            short_exe += ".exe";
        }
        let usage = format!(
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --seeds='P(0,0) = (0.2,0.0) P(5,5) = (0.4,0.0)' -o='flowpaths.out'",
            short_exe, name
        )
        .replace('*', &sep);

        TraceFlowpaths {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl FlowpathTool for TraceFlowpaths {
    fn get_source_file(&self) -> String {
        String::from(file!())
    }

    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        match serde_json::to_string(&self.parameters) {
            Ok(json_str) => format!("{{\"parameters\":{}}}", json_str),
            Err(err) => format!("{:?}", err),
        }
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let mut catchment_file = String::from("catchment.txt");
        let mut seed_spec = String::new();
        let mut output_file = String::from("flowpaths.out");
        let mut step_size = 0.01f64;
        let mut max_steps = 500usize;
        let mut descend = false;

        if args.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters. Please see help (-h) for parameter descriptions.",
            ));
        }
        for i in 0..args.len() {
            let mut arg = args[i].replace('\"', "");
            arg = arg.replace('\'', "");
            let cmd = arg.split('=');
            let vec = cmd.collect::<Vec<&str>>();
            let keyval = vec.len() > 1;
            let flag_val = vec[0].to_lowercase().replace("--", "-");
            if flag_val == "-catchment" {
                catchment_file = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
            } else if flag_val == "-seeds" {
                seed_spec = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
            } else if flag_val == "-step_size" {
                let v = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
                step_size = v.parse::<f64>().map_err(|_| {
                    Error::new(ErrorKind::InvalidInput, "Error parsing --step_size.")
                })?;
            } else if flag_val == "-max_steps" {
                let v = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
                max_steps = v.parse::<usize>().map_err(|_| {
                    Error::new(ErrorKind::InvalidInput, "Error parsing --max_steps.")
                })?;
            } else if flag_val == "-direction" {
                let v = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
                descend = v.to_lowercase().starts_with('d');
            }
        }

        if verbose {
            println!("***************{}", "*".repeat(self.get_tool_name().len()));
            println!("* Welcome to {} *", self.get_tool_name());
            println!("***************{}", "*".repeat(self.get_tool_name().len()));
        }

        if seed_spec.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The --seeds grid specification must be supplied.",
            ));
        }

        let data_dir = resolve_data_dir(working_directory)?;
        let seeds = RasterGrid::parse(&seed_spec)?;

        if verbose {
            println!("Reading catchment data...")
        };
        let mut catchment =
            Catchment::from_file(&prefixed_path(&data_dir, &catchment_file), &data_dir, 64)?;

        let start = Instant::now();
        let mut workspace = BemWorkspace::for_catchment(&catchment);
        let direction = if descend {
            FlowDirection::Descend
        } else {
            FlowDirection::Ascend
        };
        let out_path = prefixed_path(&data_dir, &output_file);
        let mut out = create_output_file(&out_path)?;

        let mut trace = Contour::with_capacity(max_steps + 1);
        let mut progress: usize;
        let mut old_progress: usize = 1;
        let mut num_traced = 0usize;
        for j in 0..seeds.ny {
            for i in 0..seeds.nx {
                let p = Point2D::new(seeds.x(i), seeds.y(j));
                streamline_loop(
                    p,
                    &mut catchment,
                    direction,
                    max_steps,
                    step_size,
                    Some(&mut trace),
                    &mut workspace,
                )?;
                if !trace.is_empty() {
                    for k in 0..trace.len() {
                        let q = trace.xy(k);
                        writeln!(out, "{} {}", q.x, q.y)?;
                    }
                    writeln!(out)?;
                    num_traced += 1;
                }
            }
            if verbose && seeds.ny > 1 {
                progress = (100.0_f64 * j as f64 / (seeds.ny - 1) as f64) as usize;
                if progress != old_progress {
                    println!("Progress: {}%", progress);
                    old_progress = progress;
                }
            }
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        println!("Traced {} flowpaths", num_traced);
        if verbose {
            println!("Output file written");
            println!("{}", &format!("Elapsed Time (excluding I/O): {}", elapsed_time));
        }

        Ok(())
    }
}
