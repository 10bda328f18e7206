/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 22/04/2024
Last Modified: 17/06/2024
License: MIT
*/

/*!
FlowPathTools computes hydrological flow-path quantities on terrains
described by nested contour loops: catchment areas draining to a mouth,
streamline traces, potential and velocity fields, water depth and runoff
risk. It is a command-line program and can be run either by calling it,
with appropriate commands and arguments, from a terminal application, or
by calling it from a script. The following commands are recognized:

| Command           | Description                                                                                      |
| ----------------- | ------------------------------------------------------------------------------------------------ |
| --cd, --wd        | Changes the working directory; used in conjunction with --run flag.                              |
| -h, --help        | Prints help information.                                                                         |
| --listtools       | Lists all available tools, with tool descriptions. Keywords may also be used, --listtools area.  |
| -r, --run         | Runs a tool; used in conjunction with --wd flag; -r="CatchmentArea".                             |
| --toolhelp        | Prints the help associated with a tool; --toolhelp="CatchmentArea".                              |
| --toolparameters  | Prints the parameters (in json form) for a specific tool; --toolparameters="CatchmentArea".      |
| -v                | Verbose mode. Without this flag, tool outputs will not be printed.                               |
| --version         | Prints the version information.                                                                  |

*/

use flowpath_tools::tools::ToolManager;
use std::env;
use std::io::Error;
use std::path;
use std::process;

/// FlowPathTools is a command-line analysis engine for contour-bounded
/// catchments.
///
/// # Examples
///
/// From the command line prompt, *FlowPathTools* can be called to run a
/// tool as follows:
///
/// ```text
/// >>./flowpath_tools --wd='/data/valley/' --run=CatchmentArea --mouth='P(0) = (2.0,3.0) P(40) = (3.0,2.0)' -v
/// ```
fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

fn run() -> Result<(), Error> {
    let sep: &str = &path::MAIN_SEPARATOR.to_string();
    let mut working_dir = String::new();
    let mut tool_name = String::new();
    let mut run_tool = false;
    let mut tool_help = false;
    let mut tool_parameters = false;
    let mut list_tools = false;
    let mut keywords: Vec<String> = vec![];
    let mut verbose = false;
    let mut finding_working_dir = false;
    let mut tool_args_vec: Vec<String> = vec![];
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        version();
        help();
        let tm = ToolManager::new(&working_dir, &false)?;
        tm.list_tools();
        return Ok(());
    }

    for arg in args.iter().skip(1) {
        let flag_val = arg.to_lowercase().replace("--", "-");
        if flag_val == "-h" || flag_val == "-help" {
            help();
            return Ok(());
        } else if flag_val.starts_with("-cd") || flag_val.starts_with("-wd") {
            let mut v = arg
                .replace("--cd", "")
                .replace("--wd", "")
                .replace("-cd", "")
                .replace("-wd", "")
                .replace('\"', "")
                .replace('\'', "");
            if v.starts_with('=') {
                v = v[1..v.len()].to_string();
            }
            if v.trim().is_empty() {
                finding_working_dir = true;
            }
            if !v.is_empty() && !v.ends_with(sep) {
                v.push_str(sep);
            }
            working_dir = v.to_string();
        } else if arg.starts_with("-run") || arg.starts_with("--run") || arg.starts_with("-r") {
            let mut v = arg
                .replace("--run", "")
                .replace("-run", "")
                .replace("-r", "")
                .replace('\"', "")
                .replace('\'', "");
            if v.starts_with('=') {
                v = v[1..v.len()].to_string();
            }
            tool_name = v;
            run_tool = true;
        } else if arg.starts_with("-toolhelp") || arg.starts_with("--toolhelp") {
            let mut v = arg
                .replace("--toolhelp", "")
                .replace("-toolhelp", "")
                .replace('\"', "")
                .replace('\'', "");
            if v.starts_with('=') {
                v = v[1..v.len()].to_string();
            }
            tool_name = v;
            tool_help = true;
        } else if arg.starts_with("-toolparameters") || arg.starts_with("--toolparameters") {
            let mut v = arg
                .replace("--toolparameters", "")
                .replace("-toolparameters", "")
                .replace('\"', "")
                .replace('\'', "");
            if v.starts_with('=') {
                v = v[1..v.len()].to_string();
            }
            tool_name = v;
            tool_parameters = true;
        } else if arg.starts_with("-listtools")
            || arg.starts_with("--listtools")
            || arg.starts_with("-list_tools")
            || arg.starts_with("--list_tools")
        {
            list_tools = true;
        } else if arg.starts_with("-version") || arg.starts_with("--version") {
            version();
            return Ok(());
        } else if flag_val == "-v" || flag_val == "-verbose" {
            verbose = true;
        } else if arg.starts_with('-') {
            // it's an arg to be fed to the tool
            tool_args_vec.push(arg.trim().to_string());
        } else if finding_working_dir {
            working_dir = arg.trim().to_string();
            if !working_dir.ends_with(sep) {
                working_dir.push_str(sep);
            }
            finding_working_dir = false;
        } else {
            // keyword for tool listing, or a positional tool arg
            keywords.push(arg.trim().to_string());
            tool_args_vec.push(arg.trim().to_string());
        }
    }

    let tm = ToolManager::new(&working_dir, &verbose)?;
    if run_tool {
        return tm.run_tool(tool_name, tool_args_vec);
    } else if tool_help {
        return tm.tool_help(tool_name);
    } else if tool_parameters {
        return tm.tool_parameters(tool_name);
    } else if list_tools {
        if keywords.is_empty() {
            tm.list_tools();
        } else {
            tm.list_tools_with_keywords(keywords);
        }
        return Ok(());
    }

    help();
    Ok(())
}

fn help() {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = r#"flowpath_tools Help

The following commands are recognized:
--cd, --wd        Changes the working directory; used in conjunction with --run flag.
-h, --help        Prints help information.
--listtools       Lists all available tools. Keywords may also be used, --listtools area.
-r, --run         Runs a tool; used in conjunction with --wd flag; -r="CatchmentArea".
--toolhelp        Prints the help associated with a tool; --toolhelp="CatchmentArea".
--toolparameters  Prints the parameters (in json form) for a specific tool; --toolparameters="CatchmentArea".
-v                Verbose mode. Without this flag, tool outputs will not be printed.
--version         Prints the version information.

Example Usage:
>> .*EXE_NAME -r=CatchmentArea --wd="*path*to*data*" --mouth='P(0) = (2.0,3.0) P(40) = (3.0,2.0)' -v
"#
    .replace("*", &sep)
    .replace("EXE_NAME", &get_exe_name());
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "flowpath_tools v{} by the FlowPath Development Team (c) 2024",
        VERSION.unwrap_or("Unknown version")
    );
}

fn get_exe_name() -> String {
    let exe = env::current_exe().unwrap_or_else(|_| "flowpath_tools".into());
    exe.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "flowpath_tools".to_string())
}
