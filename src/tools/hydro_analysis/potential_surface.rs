/*
This tool is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 13/05/2024
Last Modified: 17/06/2024
License: MIT
*/
use crate::bem::{evaluate_in_catchment, BemWorkspace, ZoneQuery};
use crate::catchment::Catchment;
use crate::io_utils::{create_output_file, prefixed_path, resolve_data_dir};
use crate::structures::{Point2D, RasterGrid};
use crate::tools::{FlowpathTool, ParameterType, ToolParameter};
use crate::utils::get_formatted_elapsed_time;
use std::env;
use std::io::{Error, ErrorKind, Write};
use std::path;
use std::time::Instant;

/// This tool evaluates the scalar potential of a contour-bounded
/// catchment over a rectangular sample grid (`--raster`, in the form
/// `P(0,0) = (x1,y1) P(nx-1,ny-1) = (x2,y2)`). Each record of the output
/// file is an `x y value` triple; rows of the grid are separated by a
/// blank line. Points outside the catchment evaluate to zero.
///
/// # See Also
/// `VelocityField`, `SectionProfile`
pub struct PotentialSurface {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl PotentialSurface {
    pub fn new() -> PotentialSurface {
        // public constructor
        let name = "PotentialSurface".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Samples the catchment potential field over a raster grid.".to_string();

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
            name: "Raster Grid".to_owned(),
            flags: vec!["--raster".to_owned()],
            description: "Sample grid, e.g. 'P(0,0) = (0.0,0.0) P(20,20) = (20.0,20.0)'."
                .to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: false,
        });
        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output x y value file.".to_owned(),
            parameter_type: ParameterType::NewFile,
            default_value: Some("height.out".to_owned()),
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
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --raster='P(0,0) = (0.0,0.0) P(20,20) = (20.0,20.0)' -o='height.out'",
            short_exe, name
        )
        .replace('*', &sep);

        PotentialSurface {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl FlowpathTool for PotentialSurface {
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
        let mut raster_spec = String::new();
        let mut output_file = String::from("height.out");

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
            } else if flag_val == "-raster" {
                raster_spec = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval { vec[1].to_string() } else { args[i + 1].to_string() };
            }
        }

        if verbose {
            println!("***************{}", "*".repeat(self.get_tool_name().len()));
            println!("* Welcome to {} *", self.get_tool_name());
            println!("***************{}", "*".repeat(self.get_tool_name().len()));
        }

        if raster_spec.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The --raster grid specification must be supplied.",
            ));
        }

        let data_dir = resolve_data_dir(working_directory)?;
        let grid = RasterGrid::parse(&raster_spec)?;

        if verbose {
            println!("Reading catchment data...")
        };
        let mut catchment =
            Catchment::from_file(&prefixed_path(&data_dir, &catchment_file), &data_dir, 64)?;

        let start = Instant::now();
        let mut workspace = BemWorkspace::for_catchment(&catchment);
        let out_path = prefixed_path(&data_dir, &output_file);
        let mut out = create_output_file(&out_path)?;

        let mut progress: usize;
        let mut old_progress: usize = 1;
        let mut outside_seen = false;
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let p = Point2D::new(grid.x(i), grid.y(j));
                let (sol, zq) = evaluate_in_catchment(&mut catchment, &p, &mut workspace)?;
                if zq == ZoneQuery::Outside {
                    outside_seen = true;
                }
                writeln!(out, "{:14.5e} {:14.5e} {:14.5e}", p.x, p.y, sol.voltage)?;
            }
            writeln!(out)?;
            if verbose {
                progress = (100.0_f64 * j as f64 / (grid.ny - 1) as f64) as usize;
                if progress != old_progress {
                    println!("Progress: {}%", progress);
                    old_progress = progress;
                }
            }
        }
        if verbose && outside_seen {
            println!("Note: some grid points fall outside the catchment.");
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("Output file written");
            println!("{}", &format!("Elapsed Time (excluding I/O): {}", elapsed_time));
        }

        Ok(())
    }
}
