use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::models::Position;

use super::ArmController;

/// Go limp, let the operator place the arm by hand, and read back where it ended up.
pub fn prompt_position<A, R, W>(arm: &mut A, label: &str, input: &mut R, output: &mut W) -> Result<Position>
where
    A: ArmController + ?Sized,
    R: BufRead,
    W: Write,
{
    arm.set_servo_detach(true)?;

    write!(output, "Press Enter to record the {label} position")?;
    output.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .with_context(|| format!("failed to read confirmation for {label} position"))?;

    let position = arm.get_position()?.rounded();
    log::info!("{label} position recorded at {position}");
    Ok(position)
}
