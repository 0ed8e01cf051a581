//! Unity C# script template.

/// Render the `MonoBehaviour` boilerplate for `script_type`, with `description` as a
/// leading comment. Both inputs are substituted verbatim.
pub fn render_template(script_type: &str, description: &str) -> String {
    // Blank lines inside the class body keep their four-space indent.
    format!(
        "using UnityEngine;\n\
         \n\
         public class {script_type} : MonoBehaviour\n\
         {{\n\
         \x20   // {description}\n\
         \x20   \n\
         \x20   void Start()\n\
         \x20   {{\n\
         \x20       // Initialization code here\n\
         \x20   }}\n\
         \x20   \n\
         \x20   void Update()\n\
         \x20   {{\n\
         \x20       // Update logic here\n\
         \x20   }}\n\
         }}"
    )
}
