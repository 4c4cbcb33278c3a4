//! Line commands understood by the interactive shell

use anyhow::{bail, Context, Result};
use fitfield_render::FieldKind;
use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  add <x> <y>             add a point with the default normal
  move <id> <x> <y>       move a point
  flip <id>               reverse the normal of a point
  rotate <id> <radians>   rotate the normal of a point
  pick <x> <y>            print the point under a position
  fit [name]              select the field evaluator, or list them
  scale <s>               set the fit scale
  iter <n>                set the number of MLS iterations
  anchor <id>             set the anchor point
  traj <on|off>           toggle projection trajectories
  fitview                 rescale the points to fill the image
  size <w> <h>            resize the image
  load <path>             replace the points with a point file
  save <path>             write the points to a file
  export <path>           write the current frame as a PNG
  list                    print all points
  help                    show this message
  quit                    leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { x: f32, y: f32 },
    Move { id: usize, x: f32, y: f32 },
    Flip { id: usize },
    Rotate { id: usize, delta: f32 },
    Pick { x: f32, y: f32 },
    Fit(Option<FieldKind>),
    Scale(f32),
    Iterations(u32),
    Anchor(usize),
    Trajectories(bool),
    FitView,
    Resize { width: usize, height: usize },
    Load(PathBuf),
    Save(PathBuf),
    Export(PathBuf),
    List,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match word {
            "add" => {
                let [x, y] = arguments::<2>(&args, word)?;
                Command::Add { x: number(x)?, y: number(y)? }
            }
            "move" => {
                let [id, x, y] = arguments::<3>(&args, word)?;
                Command::Move { id: number(id)?, x: number(x)?, y: number(y)? }
            }
            "flip" => {
                let [id] = arguments::<1>(&args, word)?;
                Command::Flip { id: number(id)? }
            }
            "rotate" => {
                let [id, delta] = arguments::<2>(&args, word)?;
                Command::Rotate { id: number(id)?, delta: number(delta)? }
            }
            "pick" => {
                let [x, y] = arguments::<2>(&args, word)?;
                Command::Pick { x: number(x)?, y: number(y)? }
            }
            // names contain spaces, so take the rest of the line verbatim
            "fit" if rest.is_empty() => Command::Fit(None),
            "fit" => Command::Fit(Some(FieldKind::from_name(rest)?)),
            "scale" => {
                let [scale] = arguments::<1>(&args, word)?;
                Command::Scale(number(scale)?)
            }
            "iter" => {
                let [n] = arguments::<1>(&args, word)?;
                Command::Iterations(number(n)?)
            }
            "anchor" => {
                let [id] = arguments::<1>(&args, word)?;
                Command::Anchor(number(id)?)
            }
            "traj" => {
                let [state] = arguments::<1>(&args, word)?;
                Command::Trajectories(switch(state)?)
            }
            "fitview" => Command::FitView,
            "size" => {
                let [width, height] = arguments::<2>(&args, word)?;
                Command::Resize { width: number(width)?, height: number(height)? }
            }
            "load" => Command::Load(path(rest, word)?),
            "save" => Command::Save(path(rest, word)?),
            "export" => Command::Export(path(rest, word)?),
            "list" => Command::List,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command \"{other}\", type \"help\""),
        };
        Ok(Some(command))
    }

    /// Whether the command changes what gets rendered
    pub fn needs_render(&self) -> bool {
        !matches!(
            self,
            Command::Pick { .. }
                | Command::Fit(None)
                | Command::Save(_)
                | Command::Export(_)
                | Command::List
                | Command::Help
                | Command::Quit
        )
    }
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    })
}

fn arguments<'a, const N: usize>(args: &[&'a str], command: &str) -> Result<[&'a str; N]> {
    args.try_into()
        .map_err(|_| anyhow::anyhow!("\"{command}\" takes {N} argument(s), got {}", args.len()))
}

fn number<T>(token: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    token
        .parse()
        .with_context(|| format!("invalid number \"{token}\""))
}

fn switch(token: &str) -> Result<bool> {
    match token {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => bail!("expected on or off, got \"{token}\""),
    }
}

fn path(rest: &str, command: &str) -> Result<PathBuf> {
    if rest.is_empty() {
        bail!("\"{command}\" needs a path");
    }
    Ok(PathBuf::from(rest))
}
