//! Line-oriented interactive mode

use crate::commands::{Command, HELP};
use anyhow::{Context, Result};
use fitfield_core::Point2f;
use fitfield_io::{read_point_set, write_png, write_point_set, ColorEncoding};
use fitfield_render::{FieldKind, FitParameters, RenderingContext, Session};
use std::io::{BufRead, Write};

/// Drives a [`Session`] from text commands
pub struct Shell {
    session: Session,
    encoding: ColorEncoding,
}

impl Shell {
    pub fn new(session: Session, encoding: ColorEncoding) -> Self {
        Self { session, encoding }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{} points loaded, type \"help\" for commands", self.session.points().len())?;
        self.refresh(out)?;

        for line in input.lines() {
            let line = line.context("failed to read command")?;
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(out, "error: {e:#}")?;
                    continue;
                }
            };

            match self.execute(&command, out) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    writeln!(out, "error: {e:#}")?;
                    continue;
                }
            }
            if command.needs_render() {
                self.refresh(out)?;
            }
        }
        Ok(())
    }

    /// Apply one command. Returns `false` once the shell should stop.
    pub fn execute<W: Write>(&mut self, command: &Command, out: &mut W) -> Result<bool> {
        let session = &mut self.session;
        match command {
            Command::Add { x, y } => {
                let id = session.add_point(*x, *y);
                writeln!(out, "added point {id}")?;
            }
            Command::Move { id, x, y } => session.move_point(*id, *x, *y)?,
            Command::Flip { id } => session.flip_normal(*id)?,
            Command::Rotate { id, delta } => session.rotate_normal(*id, *delta)?,
            Command::Pick { x, y } => match session.find_point(&Point2f::new(*x, *y)) {
                Some(id) => writeln!(out, "point {id}")?,
                None => writeln!(out, "no point here")?,
            },
            Command::Fit(Some(kind)) => session.set_field(*kind),
            Command::Fit(None) => {
                let current = session.pipeline().field_kind();
                for kind in FieldKind::all() {
                    let marker = if kind == current { '*' } else { ' ' };
                    writeln!(out, "{marker} {kind}")?;
                }
            }
            Command::Scale(scale) => {
                let params = session.pipeline().config.params;
                session.set_params(FitParameters::new(*scale, params.iterations)?)?;
            }
            Command::Iterations(iterations) => {
                let params = session.pipeline().config.params;
                session.set_params(FitParameters::new(params.scale, *iterations)?)?;
            }
            Command::Anchor(id) => session.set_anchor(*id),
            Command::Trajectories(on) => session.set_trajectories(*on),
            Command::FitView => session.fit_view(),
            Command::Resize { width, height } => {
                let ctx = RenderingContext { width: *width, height: *height, ..*session.context() };
                session.set_context(ctx)?;
            }
            Command::Load(path) => {
                let points = read_point_set(path)
                    .with_context(|| format!("failed to load {}", path.display()))?;
                writeln!(out, "{} points loaded", points.len())?;
                session.set_points(points);
            }
            Command::Save(path) => {
                write_point_set(session.points(), path)
                    .with_context(|| format!("failed to save {}", path.display()))?;
                writeln!(out, "saved {}", path.display())?;
            }
            Command::Export(path) => {
                write_png(session.frame(), path, self.encoding)
                    .with_context(|| format!("failed to export {}", path.display()))?;
                writeln!(out, "exported {}", path.display())?;
            }
            Command::List => {
                for (id, p) in session.points().iter().enumerate() {
                    let n = p.normal();
                    writeln!(
                        out,
                        "{id}: {} {} normal {:.3} {:.3}",
                        p.position.x, p.position.y, n.x, n.y
                    )?;
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Re-render, keeping the previous frame when the configuration is invalid
    fn refresh<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if let Err(e) = self.session.render() {
            writeln!(out, "render failed: {e} (showing last frame)")?;
        }
        Ok(())
    }
}
