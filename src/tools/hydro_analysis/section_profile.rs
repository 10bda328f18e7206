/*
This tool is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 23/05/2024
Last Modified: 17/06/2024
License: MIT
*/
use crate::bem::{evaluate_in_catchment, BemWorkspace};
use crate::catchment::Catchment;
use crate::flow::model::{depth, velocity};
use crate::flow::{streamline_loop, FlowDirection};
use crate::io_utils::{create_output_file, prefixed_path, resolve_data_dir};
use crate::structures::Section;
use crate::tools::{FlowpathTool, ParameterType, ToolParameter};
use crate::utils::get_formatted_elapsed_time;
use std::env;
use std::io::{Error, ErrorKind, Write};
use std::path;
use std::time::Instant;

/// This tool samples a flow quantity along a straight cross-section of a
/// contour-bounded catchment. The `--quantity` option selects the
/// potential, the flow velocity, or the water depth (the latter traces an
/// upslope streamline per sample point). Each output record is
/// `distance value`, where distance is measured along the section.
///
/// # See Also
/// `PotentialSurface`, `VelocityField`, `MouthFlowRate`
pub struct SectionProfile {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl SectionProfile {
    pub fn new() -> SectionProfile {
        // public constructor
        let name = "SectionProfile".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Samples potential, velocity or depth along a cross-section.".to_string();

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
            name: "Section".to_owned(),
            flags: vec!["--section".to_owned()],
            description: "Cross-section, e.g. 'P(0) = (4.0,5.0) P(100) = (5.0,4.0)'.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: false,
        });
        parameters.push(ToolParameter {
            name: "Sampled Quantity".to_owned(),
            flags: vec!["--quantity".to_owned()],
            description: "Quantity to sample: 'potential', 'velocity' or 'depth'.".to_owned(),
            parameter_type: ParameterType::OptionList(vec![
                "potential".to_owned(),
                "velocity".to_owned(),
                "depth".to_owned(),
            ]),
            default_value: Some("potential".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output distance value file.".to_owned(),
            parameter_type: ParameterType::NewFile,
            default_value: Some("section.out".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Integration Step Size".to_owned(),
            flags: vec!["--step_size".to_owned()],
            description: "Streamline step size (depth sampling only).".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.1".to_owned()),
            optional: true,
        });
        parameters.push(ToolParameter {
            name: "Maximum Steps".to_owned(),
            flags: vec!["--max_steps".to_owned()],
            description: "Maximum streamline steps (depth sampling only).".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("300".to_owned()),
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
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --section='P(0) = (4.0,5.0) P(100) = (5.0,4.0)' --quantity='depth' -o='section.out'",
            short_exe, name
        )
        .replace('*', &sep);

        SectionProfile {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl FlowpathTool for SectionProfile {
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
        let mut section_spec = String::new();
        let mut quantity = String::from("potential");
        let mut output_file = String::from("section.out");
        let mut step_size = 0.1f64;
        let mut max_steps = 300usize;

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
            } else if flag_val == "-section" {
                section_spec = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
            } else if flag_val == "-quantity" {
                quantity = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
                quantity = quantity.to_lowercase();
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

        if section_spec.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The --section specification must be supplied.",
            ));
        }
        if quantity != "potential" && quantity != "velocity" && quantity != "depth" {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The --quantity must be 'potential', 'velocity' or 'depth'.",
            ));
        }

        let data_dir = resolve_data_dir(working_directory)?;
        let section = Section::parse(&section_spec)?;

        if verbose {
            println!("Reading catchment data...")
        };
        let mut catchment =
            Catchment::from_file(&prefixed_path(&data_dir, &catchment_file), &data_dir, 64)?;

        let start = Instant::now();
        let mut workspace = BemWorkspace::for_catchment(&catchment);
        let mut out = create_output_file(&prefixed_path(&data_dir, &output_file))?;

        for i in 0..section.n {
            let p = section.xy(i);
            let value = match quantity.as_str() {
                "potential" => {
                    let (sol, _) = evaluate_in_catchment(&mut catchment, &p, &mut workspace)?;
                    sol.voltage
                }
                "velocity" => {
                    let (sol, _) = evaluate_in_catchment(&mut catchment, &p, &mut workspace)?;
                    velocity(&p, &sol.grad)
                }
                _ => {
                    let (l, sol) = streamline_loop(
                        p,
                        &mut catchment,
                        FlowDirection::Ascend,
                        max_steps,
                        step_size,
                        None,
                        &mut workspace,
                    )?;
                    depth(&p, l, &sol.grad)
                }
            };
            writeln!(out, "{:14.5e} {:14.5e}", i as f64 * section.step, value)?;
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("Output file written");
            println!("{}", &format!("Elapsed Time (excluding I/O): {}", elapsed_time));
        }

        Ok(())
    }
}
