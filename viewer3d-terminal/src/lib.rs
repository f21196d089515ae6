/// Terminal front-end for the build-volume viewer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::Duration;
use viewer3d_core::keyboard::{Key, KeyboardNotice};
use viewer3d_core::scene::BuiltIn;
use viewer3d_core::{
    Camera, KeyboardController, MeshId, Scene, SceneError, SceneEvent, Triangle, View,
    ViewerSettings,
};

pub mod renderer;

pub use renderer::AsciiBackend;

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Forwarded to the transform keyboard controller.
    Transform(Key),
    /// Select the next mesh on its own.
    CycleSelection,
    /// Same as double-clicking the floor.
    ToggleAll,
    SplitSelected,
    DropSelected,
    RemoveSelected,
    NextView,
    ToggleBuildVolume,
}

impl Command {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        let command = match code {
            KeyCode::Char('q') => Command::Quit,
            KeyCode::Esc => Command::Transform(Key::Escape),
            KeyCode::Char('m') => Command::Transform(Key::Move),
            KeyCode::Char('r') => Command::Transform(Key::Rotate),
            KeyCode::Char('s') => Command::Transform(Key::Scale),
            KeyCode::Left => Command::Transform(Key::Left),
            KeyCode::Right => Command::Transform(Key::Right),
            KeyCode::Up => Command::Transform(Key::Up),
            KeyCode::Down => Command::Transform(Key::Down),
            KeyCode::PageUp => Command::Transform(Key::PageUp),
            KeyCode::PageDown => Command::Transform(Key::PageDown),
            KeyCode::Tab => Command::CycleSelection,
            KeyCode::Char('a') => Command::ToggleAll,
            KeyCode::Char('p') => Command::SplitSelected,
            KeyCode::Char('f') => Command::DropSelected,
            KeyCode::Delete | KeyCode::Backspace => Command::RemoveSelected,
            KeyCode::Char('v') => Command::NextView,
            KeyCode::Char('b') => Command::ToggleBuildVolume,
            _ => return None,
        };
        Some(command)
    }
}

fn scene_error(error: SceneError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error)
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    scene: Scene<AsciiBackend>,
    keyboard: KeyboardController,
    view: View,
    status: String,
    running: bool,
}

impl TerminalApp {
    /// Build the app for the current terminal size.
    pub fn new(settings: ViewerSettings) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(settings, width as usize, height.saturating_sub(1) as usize)
    }

    /// Build the app for a `width` x `height` drawing area.
    pub fn with_size(settings: ViewerSettings, width: usize, height: usize) -> io::Result<Self> {
        let camera = Camera::new(&settings.camera, width as u32, height as u32);
        let backend = AsciiBackend::new(width, height, camera);
        let mut scene = Scene::new(settings, backend).map_err(scene_error)?;

        scene.subscribe(|event| match event {
            SceneEvent::MeshAdded(mesh) => {
                log::info!("added {} ({}, {} faces)", mesh.id(), mesh.name(), mesh.face_count())
            }
            SceneEvent::MeshRemoved(id) => log::info!("removed {id}"),
            SceneEvent::MeshSelected { mesh, selected } => {
                log::debug!("{} selected: {selected}", mesh.id())
            }
        });

        let mut app = Self {
            scene,
            keyboard: KeyboardController::new(),
            view: View::Default,
            status: String::new(),
            running: true,
        };
        app.apply_view();
        Ok(app)
    }

    pub fn scene(&self) -> &Scene<AsciiBackend> {
        &self.scene
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn add_mesh(&mut self, name: &str, triangles: &[Triangle]) -> io::Result<MeshId> {
        self.scene
            .add_mesh(name, triangles, None, true)
            .map_err(scene_error)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.scene.render();
        self.draw()?;

        while self.running {
            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            match event::read()? {
                Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    ..
                }) => {
                    if let Some(command) = Command::from_key_code(code) {
                        self.execute(command)?;
                    }
                }
                Event::Resize(width, height) => {
                    self.scene
                        .backend_mut()
                        .resize(width as usize, height.saturating_sub(1) as usize);
                    self.apply_view();
                }
                _ => continue,
            }
            self.scene.render();
            self.draw()?;
        }

        Ok(())
    }

    /// Run one command against the scene. Does not draw.
    pub fn execute(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Quit => self.running = false,
            Command::Transform(key) => {
                let response = self.keyboard.handle(key);
                for notice in &response.notices {
                    self.status = match notice {
                        KeyboardNotice::Enabled => "keyboard enabled".to_owned(),
                        KeyboardNotice::Disabled => "keyboard disabled (Esc to enable)".to_owned(),
                        KeyboardNotice::Changed => format!("{:?}", self.keyboard.action()),
                    };
                }
                if let Some(action) = response.transform {
                    self.scene.transform_selected(&action);
                }
            }
            Command::CycleSelection => self.cycle_selection()?,
            Command::ToggleAll => self
                .scene
                .double_click(BuiltIn::Floor.name())
                .map_err(scene_error)?,
            Command::SplitSelected => {
                let outcomes = self.scene.split_selected().map_err(scene_error)?;
                let pieces: usize = outcomes.iter().map(|(_, outcome)| outcome.pieces().len()).sum();
                self.status = format!("split {} meshes into {pieces} pieces", outcomes.len());
            }
            Command::DropSelected => self.scene.drop_selected().map_err(scene_error)?,
            Command::RemoveSelected => {
                for id in self.scene.selection().ids().to_vec() {
                    self.scene.remove_mesh(id).map_err(scene_error)?;
                }
            }
            Command::NextView => {
                self.view = self.view.next();
                self.apply_view();
                self.status = format!("view: {}", self.view.name());
            }
            Command::ToggleBuildVolume => self
                .scene
                .toggle_element(BuiltIn::BuildVolume.name(), None)
                .map_err(scene_error)?,
        }
        Ok(())
    }

    fn cycle_selection(&mut self) -> io::Result<()> {
        let meshes: Vec<MeshId> = self.scene.registry().meshes().map(|mesh| mesh.id()).collect();
        if meshes.is_empty() {
            return Ok(());
        }
        let next = match self.scene.selection().ids().last() {
            Some(current) => meshes
                .iter()
                .position(|id| id == current)
                .map_or(0, |index| (index + 1) % meshes.len()),
            None => 0,
        };

        self.scene.unselect_all().map_err(scene_error)?;
        self.scene.select(meshes[next], true).map_err(scene_error)?;
        if let Some(mesh) = self.scene.mesh(meshes[next]) {
            self.status = format!("selected {}", mesh.name());
        }
        Ok(())
    }

    fn apply_view(&mut self) {
        let settings = self.scene.settings();
        let size = settings.build_volume.size;
        let margin = settings.floor.margin;
        let target = self.scene.center_position();
        self.scene
            .backend_mut()
            .camera_mut()
            .set_view(self.view, &size, margin, target);
    }

    fn draw(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;
        self.scene.backend().draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "viewer3d | {} selected | Tab=Select A=All M/R/S=Mode Arrows/PgUp/PgDn=Move P=Split F=Drop Del=Remove V=View Q=Quit | {}",
                self.scene.selection().len(),
                self.status
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
