/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 22/04/2024
Last Modified: 17/06/2024
License: MIT
*/
pub mod hydro_analysis;

use crate::utils::wrapped_text;
use serde_json;
use std::io::{Error, ErrorKind};

#[derive(Default)]
pub struct ToolManager {
    pub working_dir: String,
    pub verbose: bool,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new<'a>(working_directory: &'a str, verbose_mode: &'a bool) -> Result<ToolManager, Error> {
        let mut tool_names = vec![];
        // hydro_analysis
        tool_names.push("CatchmentArea".to_string());
        tool_names.push("MouthFlowRate".to_string());
        tool_names.push("PotentialSurface".to_string());
        tool_names.push("RunoffRisk".to_string());
        tool_names.push("SectionProfile".to_string());
        tool_names.push("TraceFlowpaths".to_string());
        tool_names.push("VelocityField".to_string());

        let tm = ToolManager {
            working_dir: working_directory.to_string(),
            verbose: *verbose_mode,
            tool_names,
        };
        Ok(tm)
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn FlowpathTool + 'static>> {
        match tool_name.to_lowercase().replace('_', "").as_ref() {
            // hydro_analysis
            "catchmentarea" => Some(Box::new(hydro_analysis::CatchmentArea::new())),
            "mouthflowrate" => Some(Box::new(hydro_analysis::MouthFlowRate::new())),
            "potentialsurface" => Some(Box::new(hydro_analysis::PotentialSurface::new())),
            "runoffrisk" => Some(Box::new(hydro_analysis::RunoffRisk::new())),
            "sectionprofile" => Some(Box::new(hydro_analysis::SectionProfile::new())),
            "traceflowpaths" => Some(Box::new(hydro_analysis::TraceFlowpaths::new())),
            "velocityfield" => Some(Box::new(hydro_analysis::VelocityField::new())),
            _ => None,
        }
    }

    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool.run(args, &self.working_dir, self.verbose),
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => {
                println!("{}", get_help(tool));
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn tool_parameters(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => {
                println!("{}", tool.get_tool_parameters());
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn list_tools(&self) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for name in &self.tool_names {
            let tool = self
                .get_tool(name)
                .unwrap_or_else(|| panic!("Unrecognized tool name {}.", name));
            tool_details.push(get_name_and_description(tool));
        }
        let mut ret = format!("All {} Available Tools:\n", self.tool_names.len());
        for detail in tool_details {
            ret.push_str(&format!("{}: {}\n\n", detail.0, detail.1));
        }
        println!("{}", ret);
    }

    pub fn list_tools_with_keywords(&self, keywords: Vec<String>) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for name in &self.tool_names {
            let tool = self
                .get_tool(name)
                .unwrap_or_else(|| panic!("Unrecognized tool name {}.", name));
            let (tool_name, description) = get_name_and_description(tool);
            for kw in &keywords {
                if tool_name.to_lowercase().contains(&kw.to_lowercase())
                    || description.to_lowercase().contains(&kw.to_lowercase())
                {
                    tool_details.push((tool_name, description));
                    break;
                }
            }
        }
        let mut ret = format!("{} Tools containing keywords:\n", tool_details.len());
        for detail in tool_details {
            ret.push_str(&format!("{}: {}\n\n", detail.0, detail.1));
        }
        println!("{}", ret);
    }
}

pub trait FlowpathTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn get_source_file(&self) -> String;
    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error>;
}

fn get_help<'a>(wt: Box<dyn FlowpathTool + 'a>) -> String {
    let tool_name = wt.get_tool_name();
    let description = wrapped_text(&wt.get_tool_description(), 76);
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters).unwrap();
    let a = o["parameters"].as_array().unwrap();
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    for d in a {
        let mut s = String::new();
        for f in d["flags"].as_array().unwrap() {
            s.push_str(&format!("{}, ", f.as_str().unwrap()));
        }
        p.push_str(&format!(
            "{:width$} {}\n",
            s.trim().trim_matches(','),
            d["description"].as_str().unwrap(),
            width = 18
        ));
    }
    let example = wt.get_example_usage();
    if example.len() <= 1 {
        format!(
            "{}

Description:\n{}
Toolbox: {}
Parameters:\n
{}
",
            tool_name, description, toolbox, p
        )
    } else {
        format!(
            "{}
Description:\n{}
Toolbox: {}
Parameters:\n
{}

Example usage:
{}
",
            tool_name, description, toolbox, p, example
        )
    }
}

fn get_name_and_description<'a>(wt: Box<dyn FlowpathTool + 'a>) -> (String, String) {
    (wt.get_tool_name(), wt.get_tool_description())
}

#[derive(Serialize, Deserialize, Debug)]
struct ToolParameter {
    name: String,
    flags: Vec<String>,
    description: String,
    parameter_type: ParameterType,
    default_value: Option<String>,
    optional: bool,
}

#[derive(Serialize, Deserialize, Debug)]
enum ParameterType {
    Boolean,
    String,
    Integer,
    Float,
    ExistingFile,
    NewFile,
    OptionList(Vec<String>),
}

#[cfg(test)]
mod test {
    use super::ToolManager;

    #[test]
    fn test_every_registered_tool_resolves() {
        let tm = ToolManager::new("", &false).unwrap();
        for name in &tm.tool_names {
            assert!(tm.get_tool(name).is_some(), "tool {} did not resolve", name);
            // names round-trip through the case-insensitive lookup
            assert!(tm.get_tool(&name.to_lowercase()).is_some());
        }
    }

    #[test]
    fn test_tool_parameters_are_valid_json() {
        let tm = ToolManager::new("", &false).unwrap();
        for name in &tm.tool_names {
            let tool = tm.get_tool(name).unwrap();
            let params = tool.get_tool_parameters();
            let parsed: serde_json::Value = serde_json::from_str(&params).unwrap();
            assert!(parsed["parameters"].is_array(), "{} parameters", name);
        }
    }
}
