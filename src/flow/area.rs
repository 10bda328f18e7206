/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 08/04/2024
Last Modified: 17/06/2024
License: MIT
*/

//! Integration of streamline quantities across a mouth section.
//!
//! A streamline is launched from every sample point of the mouth; the
//! trapezoid rule accumulates length (catchment area) or depth times
//! current density (mass flow rate), each weighted by the sine of the
//! angle between the mouth and the local gradient. Only as many full
//! traces as the caller supplies buffers for are retained; the remaining
//! streamlines run without a trace.

use super::model::{current_density, depth};
use super::streamline::{streamline_loop, FlowDirection};
use crate::bem::BemWorkspace;
use crate::catchment::Catchment;
use crate::errors::FlowpathError;
use crate::structures::{Contour, Point2D, Section};

/// sin(theta) between the mouth direction (dx, dy) and the gradient,
/// from cos^2 clipped into [0, 1] to absorb numerical drift. A vanishing
/// gradient contributes nothing.
fn sin_theta(dx: f64, dy: f64, dw: f64, grad: &Point2D) -> f64 {
    let gsq = grad.x * grad.x + grad.y * grad.y;
    if gsq <= 0.0 {
        return 0.0;
    }
    let mut cosq = (dx * grad.x + dy * grad.y) / dw;
    cosq = cosq * cosq / gsq;
    if cosq > 1.0 {
        cosq = 1.0;
    }
    (1.0 - cosq).sqrt()
}

/// Total catchment area draining across the mouth:
/// (dw/2) * sum of L_i sin(theta_i) + L_{i+1} sin(theta_{i+1}).
#[allow(clippy::too_many_arguments)]
pub fn catchment_area(
    c: &mut Catchment,
    mouth: &Section,
    direction: FlowDirection,
    max_steps: usize,
    step_size: f64,
    traces: &mut [Contour],
    ws: &mut BemWorkspace,
) -> Result<f64, FlowpathError> {
    integrate_across_mouth(c, mouth, direction, max_steps, step_size, traces, ws, |_p, l, _g| l)
}

/// Mass flow rate through the mouth: as `catchment_area`, with each
/// sample weighted by water depth times current density instead of arc
/// length.
#[allow(clippy::too_many_arguments)]
pub fn mouth_flow_rate(
    c: &mut Catchment,
    mouth: &Section,
    direction: FlowDirection,
    max_steps: usize,
    step_size: f64,
    traces: &mut [Contour],
    ws: &mut BemWorkspace,
) -> Result<f64, FlowpathError> {
    integrate_across_mouth(
        c,
        mouth,
        direction,
        max_steps,
        step_size,
        traces,
        ws,
        |p, l, g| depth(p, l, g) * current_density(p, g),
    )
}

#[allow(clippy::too_many_arguments)]
fn integrate_across_mouth<F>(
    c: &mut Catchment,
    mouth: &Section,
    direction: FlowDirection,
    max_steps: usize,
    step_size: f64,
    traces: &mut [Contour],
    ws: &mut BemWorkspace,
    weight: F,
) -> Result<f64, FlowpathError>
where
    F: Fn(&Point2D, f64, &Point2D) -> f64,
{
    let n = mouth.n - 1;
    let n_stream = traces.len();
    let dx = (mouth.p2.x - mouth.p1.x) / n as f64;
    let dy = (mouth.p2.y - mouth.p1.y) / n as f64;
    let dw = mouth.step;

    let mut p = mouth.xy(0);
    let (l, sol) = streamline_loop(
        p,
        c,
        direction,
        max_steps,
        step_size,
        traces.first_mut(),
        ws,
    )?;
    let mut f_old = weight(&p, l, &sol.grad);
    let mut s_old = sin_theta(dx, dy, dw, &sol.grad);

    let mut sum = 0.0;
    let mut k = 1usize;
    for i in 1..mouth.n {
        p = mouth.xy(i);
        let trace = if n_stream > 1 && i * (n_stream - 1) >= k * n && k < n_stream {
            let t = traces.get_mut(k);
            k += 1;
            t
        } else {
            None
        };
        let (l, sol) = streamline_loop(p, c, direction, max_steps, step_size, trace, ws)?;
        let f_new = weight(&p, l, &sol.grad);
        let s_new = sin_theta(dx, dy, dw, &sol.grad);
        sum += f_old * s_old + f_new * s_new;
        f_old = f_new;
        s_old = s_new;
    }
    Ok(sum * dw / 2.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bem::BemWorkspace;
    use crate::catchment::{Catchment, Zone};
    use crate::flow::streamline::FlowDirection;
    use crate::structures::{Contour, Point2D, Section};

    fn unit_square_catchment() -> Catchment {
        let mut c = Catchment::new(1, 2);
        let i = c
            .pool_mut()
            .insert(
                "sq.txt",
                Contour::new_closed(
                    vec![
                        Point2D::new(0.0, 0.0),
                        Point2D::new(1.0, 0.0),
                        Point2D::new(1.0, 1.0),
                        Point2D::new(0.0, 1.0),
                    ],
                    vec![0.0, 1.0, 2.0, 1.0],
                ),
            )
            .unwrap();
        let z = Zone::assemble(vec![i], c.pool()).unwrap();
        c.push_zone(z).unwrap();
        c
    }

    #[test]
    fn test_catchment_area_of_diagonal_field() {
        // mouth along the bottom edge (nudged inside); with V = x + y
        // streamlines leave along the diagonal, sin(theta) = 1/sqrt(2),
        // and the drained area is 1/2
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let eps = 1e-4;
        let mouth = Section::new(
            5,
            Point2D::new(eps, eps),
            Point2D::new(1.0 - eps, eps),
        );
        let mut traces = vec![Contour::with_capacity(600); 5];
        let area = catchment_area(
            &mut c,
            &mouth,
            FlowDirection::Ascend,
            1000,
            0.05,
            &mut traces,
            &mut ws,
        )
        .unwrap();
        assert!(
            (area - 0.5).abs() < 0.5 * 1e-2,
            "area {} (expected about 0.5)",
            area
        );
        // every retained trace was filled
        for t in &traces {
            assert!(!t.is_empty());
        }
    }

    #[test]
    fn test_area_stable_under_fewer_retained_traces() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let eps = 1e-4;
        let mouth = Section::new(5, Point2D::new(eps, eps), Point2D::new(1.0 - eps, eps));

        let mut all = vec![Contour::with_capacity(600); 5];
        let a1 = catchment_area(
            &mut c,
            &mouth,
            FlowDirection::Ascend,
            1000,
            0.05,
            &mut all,
            &mut ws,
        )
        .unwrap();

        // trace retention only changes what is recorded, not the area
        let mut c2 = unit_square_catchment();
        let mut ws2 = BemWorkspace::for_catchment(&c2);
        let mut few = vec![Contour::with_capacity(600); 2];
        let a2 = catchment_area(
            &mut c2,
            &mouth,
            FlowDirection::Ascend,
            1000,
            0.05,
            &mut few,
            &mut ws2,
        )
        .unwrap();
        assert!((a1 - a2).abs() < 1e-9, "{} vs {}", a1, a2);
    }

    #[test]
    fn test_flow_rate_positive_for_draining_mouth() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let eps = 1e-3;
        let mouth = Section::new(5, Point2D::new(eps, eps), Point2D::new(1.0 - eps, eps));
        let mut traces = vec![Contour::with_capacity(600); 2];
        let q = mouth_flow_rate(
            &mut c,
            &mouth,
            FlowDirection::Ascend,
            1000,
            0.05,
            &mut traces,
            &mut ws,
        )
        .unwrap();
        assert!(q > 0.0 && q.is_finite());
    }
}
