/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 12/02/2024
Last Modified: 27/05/2024
License: MIT
*/
use crate::errors::FlowpathError;
use crate::structures::Contour;

/// A bounded, insertion-ordered set of loaded contours keyed by the file
/// name each was loaded from. Zones reference pool entries by index, so a
/// contour named by several zone files is loaded once and shared. The pool
/// owns the contours for the lifetime of the catchment.
#[derive(Debug)]
pub struct ContourPool {
    names: Vec<String>,
    contours: Vec<Contour>,
    max_contours: usize,
}

impl ContourPool {
    pub fn new(max_contours: usize) -> ContourPool {
        ContourPool {
            names: Vec::with_capacity(max_contours),
            contours: Vec::with_capacity(max_contours),
            max_contours,
        }
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Index of a previously loaded contour, by file name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Adds a contour under a file name, returning its index. Exceeding
    /// the bound fixed at construction is a Capacity error.
    pub fn insert(&mut self, name: &str, contour: Contour) -> Result<usize, FlowpathError> {
        if self.contours.len() >= self.max_contours {
            return Err(FlowpathError::Capacity(format!(
                "only {} contours reserved for catchment but trying to load more",
                self.max_contours
            )));
        }
        self.names.push(name.to_string());
        self.contours.push(contour);
        Ok(self.contours.len() - 1)
    }

    pub fn get(&self, index: usize) -> &Contour {
        &self.contours[index]
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }
}
