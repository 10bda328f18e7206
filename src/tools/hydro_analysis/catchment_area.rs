/*
This tool is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 06/05/2024
Last Modified: 17/06/2024
License: MIT
*/
use crate::bem::BemWorkspace;
use crate::catchment::Catchment;
use crate::flow::{catchment_area, FlowDirection};
use crate::io_utils::{prefixed_path, resolve_data_dir, write_loop_outlines, write_traces};
use crate::structures::{Contour, Section};
use crate::tools::{FlowpathTool, ParameterType, ToolParameter};
use crate::utils::get_formatted_elapsed_time;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;
use std::time::Instant;

/// This tool computes the total area draining across a mouth cross-section
/// of a contour-bounded catchment (`--catchment`). A streamline is traced
/// from every sample point of the mouth (`--mouth`, in the form
/// `P(0) = (x1,y1) P(n-1) = (x2,y2)`), following the potential gradient
/// until it leaves the catchment, and the drained area is the integral of
/// streamline length times the sine of the angle between the mouth and the
/// local gradient. Up to `--n_stream` full traces are kept and written to
/// the output file, one `x y` pair per line with a blank line between
/// traces.
///
/// # See Also
/// `MouthFlowRate`, `TraceFlowpaths`
pub struct CatchmentArea {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl CatchmentArea {
    pub fn new() -> CatchmentArea {
        // public constructor
        let name = "CatchmentArea".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Computes the catchment area draining across a mouth cross-section.".to_string();

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
            name: "Mouth Section".to_owned(),
            flags: vec!["--mouth".to_owned()],
            description: "Mouth section, e.g. 'P(0) = (2.0,3.0) P(40) = (3.0,2.0)'.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: false,
        });
        parameters.push(ToolParameter {
            name: "Output Streamline File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output streamline trace file.".to_owned(),
            parameter_type: ParameterType::NewFile,
            default_value: Some("streamlines.out".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Output Outline File".to_owned(),
            flags: vec!["--outline".to_owned()],
            description: "Optional output file for the catchment outline.".to_owned(),
            parameter_type: ParameterType::NewFile,
            default_value: None,
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Integration Step Size".to_owned(),
            flags: vec!["--step_size".to_owned()],
            description: "Streamline integration step size.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("1.0".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Maximum Steps".to_owned(),
            flags: vec!["--max_steps".to_owned()],
            description: "Maximum number of integration steps per streamline.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("10000".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Retained Streamlines".to_owned(),
            flags: vec!["--n_stream".to_owned()],
            description: "Number of full streamline traces to retain and output.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: None,
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
            default_value: Some("descend".to_owned()),
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
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --catchment='catchment.txt' --mouth='P(0) = (2.0,3.0) P(40) = (3.0,2.0)' -o='streamlines.out'",
            short_exe, name
        )
        .replace('*', &sep);

        CatchmentArea {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl FlowpathTool for CatchmentArea {
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
        let mut mouth_spec = String::new();
        let mut output_file = String::from("streamlines.out");
        let mut outline_file = String::new();
        let mut step_size = 1.0f64;
        let mut max_steps = 10_000usize;
        let mut n_stream = 0usize;
        let mut descend = true;

        if args.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters. Please see help (-h) for parameter descriptions.",
            ));
        }
        for i in 0..args.len() {
            let mut arg = args[i].replace('\"', "");
            arg = arg.replace('\'', "");
            let cmd = arg.split('='); // in case an equals sign was used
            let vec = cmd.collect::<Vec<&str>>();
            let mut keyval = false;
            if vec.len() > 1 {
                keyval = true;
            }
            let flag_val = vec[0].to_lowercase().replace("--", "-");
            if flag_val == "-catchment" {
                catchment_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-mouth" {
                mouth_spec = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-outline" {
                outline_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
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
            } else if flag_val == "-n_stream" {
                let v = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
                n_stream = v.parse::<usize>().map_err(|_| {
                    Error::new(ErrorKind::InvalidInput, "Error parsing --n_stream.")
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

        if mouth_spec.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The --mouth section specification must be supplied.",
            ));
        }

        let data_dir = resolve_data_dir(working_directory)?;
        let mouth = Section::parse(&mouth_spec)?;
        if verbose {
            println!(
                "Mouth from ({}, {}) to ({}, {}); {} sample points, dw = {}",
                mouth.p1.x, mouth.p1.y, mouth.p2.x, mouth.p2.y, mouth.n, mouth.step
            );
        }

        if verbose {
            println!("Reading catchment data...")
        };
        let mut catchment = Catchment::from_file(
            &prefixed_path(&data_dir, &catchment_file),
            &data_dir,
            64,
        )?;

        let start = Instant::now();

        if !outline_file.is_empty() {
            write_loop_outlines(
                catchment.outline_loops(),
                &prefixed_path(&data_dir, &outline_file),
            )?;
        }

        let max_points = catchment.max_points_in_any_zone();
        if verbose {
            println!("Zones: {}", catchment.num_zones());
            println!("Maximum points in any zone: {}", max_points);
        }
        let mut workspace = BemWorkspace::for_catchment(&catchment);

        if n_stream == 0 || n_stream > mouth.n {
            n_stream = mouth.n;
        }
        let mut traces = vec![Contour::with_capacity(max_steps + 1); n_stream];
        let direction = if descend {
            FlowDirection::Descend
        } else {
            FlowDirection::Ascend
        };

        let area = catchment_area(
            &mut catchment,
            &mouth,
            direction,
            max_steps,
            step_size,
            &mut traces,
            &mut workspace,
        )?;

        if verbose {
            println!("Saving data...")
        };
        write_traces(&traces, &prefixed_path(&data_dir, &output_file))?;
        if verbose {
            println!("Output file written");
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        println!("Catchment area: {:.6}", area);
        if verbose {
            println!("{}", &format!("Elapsed Time (excluding I/O): {}", elapsed_time));
        }

        Ok(())
    }
}
