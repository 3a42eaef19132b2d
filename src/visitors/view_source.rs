use crate::project::Project;
use crate::remote::RemoteRepository;
use crate::types::ClassInfo;

use super::ClassVisitor;

/// Records each class's path inside the remote repository so renderers can
/// link to the hosted source.
pub struct ViewSourceVisitor {
    remote: RemoteRepository,
}

impl ViewSourceVisitor {
    pub fn new(remote: RemoteRepository) -> Self {
        Self { remote }
    }
}

impl ClassVisitor for ViewSourceVisitor {
    fn visit(&self, class: &mut ClassInfo, _project: &Project) -> bool {
        let path = self.remote.relative_path(&class.file);
        if class.relative_file.as_deref() == Some(path.as_str()) {
            return false;
        }
        class.relative_file = Some(path);
        true
    }
}
