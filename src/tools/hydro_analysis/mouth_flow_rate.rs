/*
This tool is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 08/05/2024
Last Modified: 17/06/2024
License: MIT
*/
use crate::bem::BemWorkspace;
use crate::catchment::Catchment;
use crate::flow::{mouth_flow_rate, FlowDirection};
use crate::io_utils::{prefixed_path, resolve_data_dir, write_traces};
use crate::structures::{Contour, Section};
use crate::tools::{FlowpathTool, ParameterType, ToolParameter};
use crate::utils::get_formatted_elapsed_time;
use std::env;
use std::io::{Error, ErrorKind};
use std::path;
use std::time::Instant;

/// This tool computes the mass flow rate (kg/s) through a mouth
/// cross-section of a contour-bounded catchment. A streamline is traced
/// upslope from every mouth sample point; the water depth accumulated
/// along it and the local current density weight the trapezoid
/// integration across the mouth. The retained streamline traces are
/// written to the output file.
///
/// # See Also
/// `CatchmentArea`, `VelocityField`
pub struct MouthFlowRate {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl MouthFlowRate {
    pub fn new() -> MouthFlowRate {
        // public constructor
        let name = "MouthFlowRate".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Computes the mass flow rate through a mouth cross-section.".to_string();

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
            default_value: Some("flowrate.out".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Integration Step Size".to_owned(),
            flags: vec!["--step_size".to_owned()],
            description: "Streamline integration step size.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.1".to_owned()),
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
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --mouth='P(0) = (2.0,3.0) P(40) = (3.0,2.0)' -o='flowrate.out'",
            short_exe, name
        )
        .replace('*', &sep);

        MouthFlowRate {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl FlowpathTool for MouthFlowRate {
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
        let mut output_file = String::from("flowrate.out");
        let mut step_size = 0.1f64;
        let mut max_steps = 500usize;

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
            } else if flag_val == "-mouth" {
                mouth_spec = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
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
            println!("Reading catchment data...")
        };
        let mut catchment =
            Catchment::from_file(&prefixed_path(&data_dir, &catchment_file), &data_dir, 64)?;

        let start = Instant::now();

        let mut workspace = BemWorkspace::for_catchment(&catchment);
        let mut traces = vec![Contour::with_capacity(max_steps + 1); mouth.n];

        let rate = mouth_flow_rate(
            &mut catchment,
            &mouth,
            FlowDirection::Ascend,
            max_steps,
            step_size,
            &mut traces,
            &mut workspace,
        )?;

        if verbose {
            println!("Saving data...")
        };
        write_traces(&traces, &prefixed_path(&data_dir, &output_file))?;

        let elapsed_time = get_formatted_elapsed_time(start);
        println!("Flow rate: {:.6} kg/s", rate);
        if verbose {
            println!("{}", &format!("Elapsed Time (excluding I/O): {}", elapsed_time));
        }

        Ok(())
    }
}
